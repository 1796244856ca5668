//! Assumption gate.
//!
//! Decides, from the assumption suites, whether running the t-test is
//! justified. A category is satisfied only if every configured check in it
//! passed; there is no majority vote. All categories are evaluated before
//! deciding so that a run failing several of them reports
//! [`GateDecision::BlockedMultiple`] rather than whichever failed first.
//!
//! # Examples
//!
//! ```
//! use u_hypothesis::gate::{evaluate, GateDecision};
//! use u_hypothesis::sample::Sample;
//! use u_hypothesis::suite::run_normality;
//!
//! let s = Sample::new("x", vec![1.0, 2.0]);
//! let suite = run_normality(&s, &["shapiro-wilks"], 0.05).unwrap();
//! assert_eq!(evaluate(&suite, None, None), GateDecision::BlockedNormalityGroup1);
//! ```

use serde::Serialize;

use crate::suite::GroupSuiteResult;

/// Whether the t-test may run, and if not, which category blocked it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateDecision {
    /// Every applicable category passed.
    Open,
    /// Group 1 failed a normality check.
    BlockedNormalityGroup1,
    /// Group 2 failed a normality check.
    BlockedNormalityGroup2,
    /// A variance-homogeneity check failed.
    BlockedVariance,
    /// More than one category failed.
    BlockedMultiple,
}

impl GateDecision {
    /// `true` if the t-test may run.
    pub fn is_open(self) -> bool {
        self == GateDecision::Open
    }

    /// Short description used in the narrative.
    pub fn describe(self) -> &'static str {
        match self {
            GateDecision::Open => "all assumptions satisfied",
            GateDecision::BlockedNormalityGroup1 => "group 1 is not normally distributed",
            GateDecision::BlockedNormalityGroup2 => "group 2 is not normally distributed",
            GateDecision::BlockedVariance => "the variances are not homogeneous",
            GateDecision::BlockedMultiple => "more than one assumption failed",
        }
    }
}

/// Evaluates the gate.
///
/// For a one-sample run pass only `group1`. For a two-sample run pass all
/// three suites; each is judged independently. Pure and total.
pub fn evaluate(
    group1: &GroupSuiteResult,
    group2: Option<&GroupSuiteResult>,
    variance: Option<&GroupSuiteResult>,
) -> GateDecision {
    let failures = [
        (!group1.all_passed(), GateDecision::BlockedNormalityGroup1),
        (
            group2.is_some_and(|s| !s.all_passed()),
            GateDecision::BlockedNormalityGroup2,
        ),
        (
            variance.is_some_and(|s| !s.all_passed()),
            GateDecision::BlockedVariance,
        ),
    ];

    let mut failed = failures.iter().filter(|(f, _)| *f).map(|&(_, d)| d);
    match (failed.next(), failed.next()) {
        (None, _) => GateDecision::Open,
        (Some(only), None) => only,
        (Some(_), Some(_)) => GateDecision::BlockedMultiple,
    }
}
