//! Assumption checks.
//!
//! Runs the configured normality tests on a sample and the configured
//! variance-homogeneity tests across two samples. Every p-value goes through
//! [`interpret`](crate::interpret::interpret).
//!
//! A check that cannot be computed (sample below the test's minimum size,
//! zero variance) is recorded as failed with the interpretation
//! [`NOT_COMPUTABLE`]; the remaining checks still run. Test names this
//! version does not know are skipped.
//!
//! # Examples
//!
//! ```
//! use u_hypothesis::sample::Sample;
//! use u_hypothesis::suite::{run_normality, NOT_COMPUTABLE};
//!
//! let s = Sample::new("tiny", vec![1.0, 2.0]);
//! let r = run_normality(&s, &["shapiro-wilks", "made-up"], 0.05).unwrap();
//! assert_eq!(r.results.len(), 1);
//! assert!(!r.results["shapiro-wilks"].passed);
//! assert_eq!(r.results["shapiro-wilks"].interpretation, NOT_COMPUTABLE);
//! ```

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::distribution::ks_test_normal;
use crate::error::{Error, Result};
use crate::interpret::{interpret, TestCategory};
use crate::sample::Sample;
use crate::testing::{bartlett_test, dagostino_k_squared_test, levene_test, shapiro_wilk_test};

/// Interpretation recorded for a check that could not be computed.
pub const NOT_COMPUTABLE: &str = "test not computable";

/// Normality tests the suite knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalityTest {
    /// Shapiro-Wilk W (n = 3..5000).
    ShapiroWilk,
    /// D'Agostino-Pearson K² (n ≥ 8).
    KSquared,
    /// Kolmogorov-Smirnov against a fitted normal (n ≥ 5).
    KolmogorovSmirnov,
}

/// Variance-homogeneity tests the suite knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarianceTest {
    /// Bartlett's test; assumes both samples are normal.
    Bartlett,
    /// Levene's test, median-centred.
    Levene,
}

impl NormalityTest {
    /// Every normality test, in canonical order.
    pub const ALL: [NormalityTest; 3] = [
        NormalityTest::ShapiroWilk,
        NormalityTest::KSquared,
        NormalityTest::KolmogorovSmirnov,
    ];

    /// Configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            NormalityTest::ShapiroWilk => "shapiro-wilks",
            NormalityTest::KSquared => "k-squared",
            NormalityTest::KolmogorovSmirnov => "kolmogorov-smirnov",
        }
    }

    /// Looks a test up by its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Recognised tests from `names`, in order, without duplicates.
    pub fn select<S: AsRef<str>>(names: &[S]) -> Vec<Self> {
        select(names, Self::from_name)
    }

    // (statistic, p) or None when the sample does not support the test
    fn compute(self, data: &[f64]) -> Option<(f64, f64)> {
        let r = match self {
            NormalityTest::ShapiroWilk => shapiro_wilk_test(data)?,
            NormalityTest::KSquared => dagostino_k_squared_test(data)?,
            NormalityTest::KolmogorovSmirnov => return ks_test_normal(data),
        };
        Some((r.statistic, r.p_value))
    }
}

impl VarianceTest {
    /// Every variance test, in canonical order.
    pub const ALL: [VarianceTest; 2] = [VarianceTest::Bartlett, VarianceTest::Levene];

    /// Configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            VarianceTest::Bartlett => "bartletts",
            VarianceTest::Levene => "levenes",
        }
    }

    /// Looks a test up by its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Recognised tests from `names`, in order, without duplicates.
    pub fn select<S: AsRef<str>>(names: &[S]) -> Vec<Self> {
        select(names, Self::from_name)
    }

    fn compute(self, a: &[f64], b: &[f64]) -> Option<(f64, f64)> {
        let r = match self {
            VarianceTest::Bartlett => bartlett_test(&[a, b]),
            VarianceTest::Levene => levene_test(&[a, b]),
        }?;
        Some((r.statistic, r.p_value))
    }
}

fn select<S: AsRef<str>, T: PartialEq>(names: &[S], lookup: impl Fn(&str) -> Option<T>) -> Vec<T> {
    let mut picked = Vec::new();
    for name in names {
        let name: &str = name.as_ref();
        match lookup(name) {
            Some(t) if !picked.contains(&t) => picked.push(t),
            Some(_) => {}
            None => warn!(test = name, "ignoring unknown test name"),
        }
    }
    picked
}

/// Outcome of one statistical check. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    /// Test statistic; NaN when not computable.
    pub statistic: f64,
    /// p-value; NaN when not computable.
    pub p_value: f64,
    /// The assumption held (p ≥ alpha).
    pub passed: bool,
    /// Human-readable interpretation.
    pub interpretation: String,
}

impl TestResult {
    fn not_computable() -> Self {
        Self {
            statistic: f64::NAN,
            p_value: f64::NAN,
            passed: false,
            interpretation: NOT_COMPUTABLE.to_string(),
        }
    }

    /// `true` if the check could not be computed.
    pub fn is_computable(&self) -> bool {
        self.interpretation != NOT_COMPUTABLE
    }
}

/// Results of one category of checks for one group, in configuration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSuiteResult {
    /// Label of the group (or "a vs b" for the variance checks).
    pub label: String,
    /// Category every result in this suite belongs to.
    pub category: TestCategory,
    /// Test name → result.
    pub results: IndexMap<String, TestResult>,
}

impl GroupSuiteResult {
    /// `true` iff every check in the suite passed.
    pub fn all_passed(&self) -> bool {
        self.results.values().all(|r| r.passed)
    }

    /// Names of the checks that failed, in configuration order.
    pub fn failed(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|(_, r)| !r.passed)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

fn check_alpha(alpha: f64) -> Result<()> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(Error::Configuration(format!(
            "alpha must lie strictly between 0 and 1, got {alpha}"
        )))
    }
}

// Numerical failures stop at this scope; they never escape the suite.
fn evaluate(name: &str, computed: Option<(f64, f64)>, alpha: f64, category: TestCategory) -> TestResult {
    let outcome = computed
        .ok_or_else(|| Error::Numerical(format!("{name} cannot be computed for this input")))
        .and_then(|(statistic, p)| Ok((statistic, p, interpret(p, alpha, category)?)));

    match outcome {
        Ok((statistic, p_value, verdict)) => {
            debug!(test = name, statistic, p_value, passed = verdict.passed(), "check complete");
            TestResult {
                statistic,
                p_value,
                passed: verdict.passed(),
                interpretation: verdict.interpretation.to_string(),
            }
        }
        Err(e) => {
            warn!(test = name, error = %e, "check not computable");
            TestResult::not_computable()
        }
    }
}

/// Runs the requested normality tests on one sample.
///
/// # Errors
///
/// [`Error::Configuration`] if `alpha` is outside (0, 1). Individual checks
/// never fail the call.
pub fn run_normality<S: AsRef<str>>(
    sample: &Sample,
    test_names: &[S],
    alpha: f64,
) -> Result<GroupSuiteResult> {
    check_alpha(alpha)?;
    let results = NormalityTest::select(test_names)
        .into_iter()
        .map(|test| {
            let computed = test.compute(&sample.values);
            (
                test.as_str().to_string(),
                evaluate(test.as_str(), computed, alpha, TestCategory::Normality),
            )
        })
        .collect();

    Ok(GroupSuiteResult {
        label: sample.label.clone(),
        category: TestCategory::Normality,
        results,
    })
}

/// Runs the requested variance-homogeneity tests across two samples.
///
/// Bartlett's test is only valid when both samples are normal. That is not
/// checked here; request it only after normality has passed.
///
/// # Errors
///
/// [`Error::Configuration`] if `alpha` is outside (0, 1).
pub fn run_variance_homogeneity<S: AsRef<str>>(
    a: &Sample,
    b: &Sample,
    test_names: &[S],
    alpha: f64,
) -> Result<GroupSuiteResult> {
    check_alpha(alpha)?;
    let results = VarianceTest::select(test_names)
        .into_iter()
        .map(|test| {
            let computed = test.compute(&a.values, &b.values);
            (
                test.as_str().to_string(),
                evaluate(test.as_str(), computed, alpha, TestCategory::VarianceHomogeneity),
            )
        })
        .collect();

    Ok(GroupSuiteResult {
        label: format!("{} vs {}", a.label, b.label),
        category: TestCategory::VarianceHomogeneity,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use u_numflow::special;

    fn normal_sample(label: &str, n: usize, mean: f64, sd: f64) -> Sample {
        let values: Vec<f64> = (1..=n)
            .map(|i| mean + sd * special::inverse_normal_cdf((i as f64 - 0.5) / n as f64))
            .collect();
        Sample::new(label, values)
    }

    #[test]
    fn order_follows_configuration() {
        let s = normal_sample("g", 30, 0.0, 1.0);
        let r = run_normality(&s, &["kolmogorov-smirnov", "shapiro-wilks", "k-squared"], 0.05)
            .expect("valid alpha");
        let names: Vec<&str> = r.results.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["kolmogorov-smirnov", "shapiro-wilks", "k-squared"]);
        assert!(r.all_passed(), "failed: {:?}", r.failed());
        assert_eq!(r.results["shapiro-wilks"].interpretation, "likely normally distributed");
    }

    #[test]
    fn unknown_and_duplicate_names_are_skipped() {
        let s = normal_sample("g", 20, 0.0, 1.0);
        let r = run_normality(&s, &["shapiro-wilks", "lilliefors", "shapiro-wilks"], 0.05)
            .expect("valid alpha");
        assert_eq!(r.results.len(), 1);
        assert!(NormalityTest::select(&["nope"]).is_empty());
    }

    #[test]
    fn tiny_sample_records_not_computable_and_continues() {
        let s = Sample::new("pair", vec![1.0, 2.0]);
        let r = run_normality(&s, &["shapiro-wilks", "k-squared", "kolmogorov-smirnov"], 0.05)
            .expect("valid alpha");
        assert_eq!(r.results.len(), 3);
        for (name, t) in &r.results {
            assert!(!t.passed, "{name}");
            assert_eq!(t.interpretation, NOT_COMPUTABLE, "{name}");
            assert!(!t.is_computable());
            assert!(t.p_value.is_nan());
        }
    }

    #[test]
    fn one_bad_check_does_not_block_the_others() {
        // n = 6: Shapiro-Wilk computes, K² needs n ≥ 8
        let s = Sample::new("outlier", vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0]);
        let r = run_normality(&s, &["shapiro-wilks", "k-squared"], 0.05).expect("valid alpha");
        let sw = &r.results["shapiro-wilks"];
        assert!(sw.is_computable());
        assert!(!sw.passed, "p = {}", sw.p_value);
        assert_eq!(sw.interpretation, "likely NOT normally distributed");
        assert_eq!(r.results["k-squared"].interpretation, NOT_COMPUTABLE);
        assert_eq!(r.failed(), vec!["shapiro-wilks", "k-squared"]);
    }

    #[test]
    fn variance_checks_on_equal_spread() {
        let a = normal_sample("a", 20, 0.0, 2.0);
        let b = normal_sample("b", 20, 5.0, 2.0);
        let r = run_variance_homogeneity(&a, &b, &["levenes", "bartletts"], 0.05)
            .expect("valid alpha");
        assert_eq!(r.label, "a vs b");
        assert_eq!(r.category, TestCategory::VarianceHomogeneity);
        assert!(r.all_passed(), "failed: {:?}", r.failed());
        assert_eq!(r.results["levenes"].interpretation, "likely homogeneous");
    }

    #[test]
    fn variance_checks_on_unequal_spread() {
        let a = normal_sample("a", 20, 0.0, 1.0);
        let b = normal_sample("b", 20, 0.0, 10.0);
        let r = run_variance_homogeneity(&a, &b, &["bartletts", "levenes"], 0.05)
            .expect("valid alpha");
        assert!(!r.all_passed());
        assert_eq!(r.results["bartletts"].interpretation, "likely NOT homogeneous");
    }

    #[test]
    fn constant_sample_makes_bartlett_not_computable() {
        let a = Sample::new("a", vec![3.0; 6]);
        let b = normal_sample("b", 6, 0.0, 1.0);
        let r = run_variance_homogeneity(&a, &b, &["bartletts", "levenes"], 0.05)
            .expect("valid alpha");
        assert_eq!(r.results["bartletts"].interpretation, NOT_COMPUTABLE);
        assert!(r.results["levenes"].is_computable());
    }

    #[test]
    fn constant_deviations_make_levene_not_computable() {
        let a = Sample::new("a", vec![1.0, 3.0, 1.0, 3.0]);
        let b = Sample::new("b", vec![5.0, 7.0, 5.0, 7.0]);
        let r = run_variance_homogeneity(&a, &b, &["levenes"], 0.05).expect("valid alpha");
        let levene = &r.results["levenes"];
        assert!(!levene.is_computable());
        assert_eq!(levene.interpretation, NOT_COMPUTABLE);
        assert!(levene.p_value.is_nan());
    }

    #[test]
    fn invalid_alpha_aborts() {
        let s = normal_sample("g", 10, 0.0, 1.0);
        assert!(matches!(
            run_normality(&s, &["shapiro-wilks"], 1.0),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn names_round_trip() {
        for t in NormalityTest::ALL {
            assert_eq!(NormalityTest::from_name(t.as_str()), Some(t));
        }
        for t in VarianceTest::ALL {
            assert_eq!(VarianceTest::from_name(t.as_str()), Some(t));
        }
    }
}
