//! Tabular report of a run.
//!
//! [`ReportTable::from_run`] flattens a [`RunResult`] into
//! `section -> row -> column -> Cell`, ready for an external table renderer.
//! Presentation labels are applied here only; the run itself keeps stable
//! [`SuiteKey`]s.

use indexmap::IndexMap;
use serde::Serialize;

use crate::compose::{RunResult, SuiteKey};

/// Section holding one row per executed assumption check.
pub const ASSUMPTION_SECTION: &str = "Assumption Checks";
/// Section holding the t-test row, present only when the t-test ran.
pub const T_TEST_SECTION: &str = "T Test";

/// A scalar table cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Numeric value. `highlight` marks a p-value below alpha.
    Number {
        /// Value; NaN renders as `null`.
        value: f64,
        /// Draw attention to this cell.
        highlight: bool,
    },
    /// Yes/no flag.
    Bool(bool),
    /// Free text.
    Text(String),
}

impl Cell {
    fn number(value: f64) -> Self {
        Cell::Number {
            value,
            highlight: false,
        }
    }

    fn p_value(value: f64, alpha: f64) -> Self {
        Cell::Number {
            value,
            highlight: value < alpha,
        }
    }

    /// `true` for a highlighted number.
    pub fn is_highlighted(&self) -> bool {
        matches!(self, Cell::Number { highlight: true, .. })
    }
}

/// Presentation names for the suites of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Labels {
    names: IndexMap<SuiteKey, String>,
}

impl Labels {
    /// No overrides; the sample labels of the run are used.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the display name of `key`.
    pub fn with(mut self, key: SuiteKey, name: impl Into<String>) -> Self {
        self.names.insert(key, name.into());
        self
    }

    fn resolve(&self, key: SuiteKey, run: &RunResult) -> String {
        if let Some(name) = self.names.get(&key) {
            return name.clone();
        }
        match key {
            SuiteKey::Group1 => run.label(0).to_string(),
            SuiteKey::Group2 => run.label(1).to_string(),
            SuiteKey::Variance => format!(
                "{} vs {}",
                self.resolve(SuiteKey::Group1, run),
                self.resolve(SuiteKey::Group2, run)
            ),
        }
    }
}

/// Columns of one row.
pub type Row = IndexMap<String, Cell>;

/// Ordered `section -> row -> column -> Cell` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportTable {
    /// Sections in display order.
    pub sections: IndexMap<String, IndexMap<String, Row>>,
}

impl ReportTable {
    /// Flattens a run.
    pub fn from_run(run: &RunResult, labels: &Labels) -> Self {
        let mut sections = IndexMap::new();

        let mut checks = IndexMap::new();
        for (&key, suite) in &run.suites {
            let group = labels.resolve(key, run);
            for (name, r) in &suite.results {
                let mut row = Row::new();
                row.insert("Statistic".into(), Cell::number(r.statistic));
                row.insert("P-Value".into(), Cell::p_value(r.p_value, run.alpha));
                row.insert("Passed".into(), Cell::Bool(r.passed));
                row.insert("Interpretation".into(), Cell::Text(r.interpretation.clone()));
                checks.insert(format!("{group} / {name}"), row);
            }
        }
        sections.insert(ASSUMPTION_SECTION.to_string(), checks);

        if let Some(o) = &run.outcome {
            let subject = if run.suites.contains_key(&SuiteKey::Group2) {
                labels.resolve(SuiteKey::Variance, run)
            } else {
                labels.resolve(SuiteKey::Group1, run)
            };
            let mut row = Row::new();
            row.insert("Tail".into(), Cell::Text(o.tail.as_str().to_string()));
            row.insert("Statistic".into(), Cell::number(o.statistic));
            row.insert("DF".into(), Cell::number(o.df));
            row.insert("P-Value".into(), Cell::p_value(o.p_value, run.alpha));
            row.insert("Significant".into(), Cell::Bool(o.significant));
            row.insert("Interpretation".into(), Cell::Text(o.interpretation.clone()));

            let mut t_test = IndexMap::new();
            t_test.insert(subject, row);
            sections.insert(T_TEST_SECTION.to_string(), t_test);
        }

        Self { sections }
    }

    /// Cell at `section / row / column`.
    pub fn cell(&self, section: &str, row: &str, column: &str) -> Option<&Cell> {
        self.sections.get(section)?.get(row)?.get(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, TestType};
    use crate::engine::{HypothesisOutcome, Tail};
    use crate::gate::GateDecision;
    use crate::interpret::TestCategory;
    use crate::suite::{GroupSuiteResult, TestResult};

    fn result(p: f64, alpha: f64) -> TestResult {
        TestResult {
            statistic: 0.95,
            p_value: p,
            passed: p >= alpha,
            interpretation: String::new(),
        }
    }

    fn two_sample_run(outcome: Option<HypothesisOutcome>) -> RunResult {
        let mut suites = IndexMap::new();
        for (key, label, category) in [
            (SuiteKey::Group1, "x", TestCategory::Normality),
            (SuiteKey::Group2, "y", TestCategory::Normality),
            (SuiteKey::Variance, "x vs y", TestCategory::VarianceHomogeneity),
        ] {
            let mut results = IndexMap::new();
            let p = if key == SuiteKey::Group2 { 0.01 } else { 0.4 };
            results.insert("shapiro-wilks".to_string(), result(p, 0.05));
            suites.insert(
                key,
                GroupSuiteResult {
                    label: label.into(),
                    category,
                    results,
                },
            );
        }
        RunResult {
            test_type: TestType::TwoSample,
            alpha: Config::default().alpha,
            labels: vec!["x".into(), "y".into()],
            suites,
            gate: GateDecision::BlockedNormalityGroup2,
            outcome,
            narrative: String::new(),
        }
    }

    #[test]
    fn rows_use_run_labels_by_default() {
        let table = ReportTable::from_run(&two_sample_run(None), &Labels::new());
        let checks = &table.sections[ASSUMPTION_SECTION];
        let rows: Vec<&str> = checks.keys().map(String::as_str).collect();
        assert_eq!(
            rows,
            vec!["x / shapiro-wilks", "y / shapiro-wilks", "x vs y / shapiro-wilks"]
        );
        assert!(!table.sections.contains_key(T_TEST_SECTION));
    }

    #[test]
    fn presentation_labels_override() {
        let labels = Labels::new()
            .with(SuiteKey::Group1, "Control")
            .with(SuiteKey::Group2, "Treatment");
        let table = ReportTable::from_run(&two_sample_run(None), &labels);
        assert!(table
            .cell(ASSUMPTION_SECTION, "Control vs Treatment / shapiro-wilks", "Passed")
            .is_some());
        assert_eq!(
            table.cell(ASSUMPTION_SECTION, "Treatment / shapiro-wilks", "Passed"),
            Some(&Cell::Bool(false))
        );
    }

    #[test]
    fn failing_p_values_are_highlighted() {
        let table = ReportTable::from_run(&two_sample_run(None), &Labels::new());
        let bad = table
            .cell(ASSUMPTION_SECTION, "y / shapiro-wilks", "P-Value")
            .expect("cell exists");
        let good = table
            .cell(ASSUMPTION_SECTION, "x / shapiro-wilks", "P-Value")
            .expect("cell exists");
        assert!(bad.is_highlighted());
        assert!(!good.is_highlighted());
        assert!(!table
            .cell(ASSUMPTION_SECTION, "y / shapiro-wilks", "Statistic")
            .expect("cell exists")
            .is_highlighted());
    }

    #[test]
    fn t_test_section_when_outcome_present() {
        let outcome = HypothesisOutcome {
            test_type: TestType::TwoSample,
            tail: Tail::TwoTailed,
            direction: None,
            statistic: 2.9,
            df: 18.0,
            p_value: 0.009,
            significant: true,
            interpretation: "likely NOT from the same population".into(),
        };
        let table = ReportTable::from_run(&two_sample_run(Some(outcome)), &Labels::new());
        let p = table
            .cell(T_TEST_SECTION, "x vs y", "P-Value")
            .expect("t-test row");
        assert!(p.is_highlighted());
        assert_eq!(
            table.cell(T_TEST_SECTION, "x vs y", "Tail"),
            Some(&Cell::Text("two-tailed".into()))
        );
    }

    #[test]
    fn serializes_cells_as_scalars() {
        let table = ReportTable::from_run(&two_sample_run(None), &Labels::new());
        let json = serde_json::to_string(&table).expect("serializes");
        assert!(json.contains("\"Passed\":true"), "{json}");
        assert!(json.contains("\"highlight\":true"), "{json}");
    }
}
