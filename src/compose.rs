//! Run result assembly.
//!
//! [`compose`] merges the suites, the gate decision and the optional t-test
//! outcome into a [`RunResult`] together with a plain-text narrative. It
//! only formats data that has already been computed.

use std::fmt::Write as _;

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::{Config, TestType};
use crate::engine::{Direction, HypothesisOutcome};
use crate::gate::GateDecision;
use crate::suite::GroupSuiteResult;

/// Stable key of a suite inside a run, independent of user labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SuiteKey {
    /// Normality checks of the first sample.
    #[serde(rename = "group-1")]
    Group1,
    /// Normality checks of the second sample.
    #[serde(rename = "group-2")]
    Group2,
    /// Variance-homogeneity checks across both samples.
    #[serde(rename = "variance")]
    Variance,
}

impl SuiteKey {
    /// Stable key text.
    pub fn as_str(self) -> &'static str {
        match self {
            SuiteKey::Group1 => "group-1",
            SuiteKey::Group2 => "group-2",
            SuiteKey::Variance => "variance",
        }
    }
}

/// Everything one analysis produced. Built fresh per run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    /// One- or two-sample run.
    pub test_type: TestType,
    /// Significance threshold the run used.
    pub alpha: f64,
    /// Sample labels, group 1 first.
    pub labels: Vec<String>,
    /// Assumption suites in evaluation order.
    pub suites: IndexMap<SuiteKey, GroupSuiteResult>,
    /// Gate decision.
    pub gate: GateDecision,
    /// t-test outcome; present iff the gate was open.
    pub outcome: Option<HypothesisOutcome>,
    /// Plain-text summary of the run.
    pub narrative: String,
}

impl RunResult {
    /// Suite stored under `key`, if the run had one.
    pub fn suite(&self, key: SuiteKey) -> Option<&GroupSuiteResult> {
        self.suites.get(&key)
    }

    /// Label of group `index` (0-based), falling back to the stable key.
    pub fn label(&self, index: usize) -> &str {
        self.labels
            .get(index)
            .map(String::as_str)
            .unwrap_or(if index == 0 { "group-1" } else { "group-2" })
    }

    /// Pretty JSON rendering for external renderers.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Assembles a [`RunResult`].
pub fn compose(
    config: &Config,
    suites: IndexMap<SuiteKey, GroupSuiteResult>,
    gate: GateDecision,
    outcome: Option<HypothesisOutcome>,
    labels: Vec<String>,
) -> RunResult {
    let mut result = RunResult {
        test_type: config.test_type,
        alpha: config.alpha,
        labels,
        suites,
        gate,
        outcome,
        narrative: String::new(),
    };
    result.narrative = narrative(&result);
    result
}

fn format_p(p: f64) -> String {
    if p.is_nan() {
        "n/a".to_string()
    } else if p < 1e-4 {
        format!("{p:.2e}")
    } else {
        format!("{p:.4}")
    }
}

fn narrative(run: &RunResult) -> String {
    let mut out = String::new();
    let kind = match run.test_type {
        TestType::OneSample => "one-sample",
        TestType::TwoSample => "two-sample",
    };
    let _ = writeln!(out, "Assumption checks for a {kind} t-test (alpha = {}):", run.alpha);

    for (key, suite) in &run.suites {
        let heading = match key {
            SuiteKey::Group1 | SuiteKey::Group2 => format!("Normality of {}", suite.label),
            SuiteKey::Variance => format!("Homogeneity of variance, {}", suite.label),
        };
        let _ = writeln!(out, "  {heading}:");
        for (name, r) in &suite.results {
            let verdict = if r.passed { "passed" } else { "failed" };
            let _ = writeln!(
                out,
                "    {name}: {verdict} (statistic = {}, p = {}), {}",
                format_p(r.statistic),
                format_p(r.p_value),
                r.interpretation
            );
        }
    }

    let gate = match run.gate {
        GateDecision::Open => "open".to_string(),
        GateDecision::BlockedNormalityGroup1 => {
            format!("blocked, {} is not normally distributed", run.label(0))
        }
        GateDecision::BlockedNormalityGroup2 => {
            format!("blocked, {} is not normally distributed", run.label(1))
        }
        other => format!("blocked, {}", other.describe()),
    };
    let _ = writeln!(out, "Gate: {gate}.");

    match &run.outcome {
        Some(o) => {
            let tail = match o.direction {
                Some(d) => format!("{} ({})", o.tail.as_str(), direction_text(d)),
                None => o.tail.as_str().to_string(),
            };
            let _ = writeln!(
                out,
                "T-test ({kind}, {tail}): t = {:.4}, df = {}, p = {}; {} at alpha = {}, samples {}.",
                o.statistic,
                o.df,
                format_p(o.p_value),
                if o.significant { "significant" } else { "not significant" },
                run.alpha,
                o.interpretation
            );
        }
        None => {
            let failed: Vec<String> = run
                .suites
                .values()
                .flat_map(|suite| {
                    suite
                        .failed()
                        .into_iter()
                        .map(move |name| format!("{name} ({})", suite.label))
                })
                .collect();
            let _ = writeln!(
                out,
                "T-test not run: the assumptions it depends on do not hold (failed: {}).",
                failed.join(", ")
            );
            let _ = writeln!(
                out,
                "The assumption results above are complete and stand on their own as diagnostics."
            );
        }
    }
    out
}

fn direction_text(d: Direction) -> &'static str {
    match d {
        Direction::Greater => "greater",
        Direction::Less => "less",
    }
}
