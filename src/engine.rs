//! t-test execution behind the assumption gate.
//!
//! The engine only computes a t-test when the gate is open. Its p-value is
//! interpreted with mean-comparison polarity: a small p rejects the null of
//! equal means and is reported as significant.
//!
//! # One-tailed p-values
//!
//! The underlying routines return two-tailed p-values. For a one-tailed test
//! the p-value is halved only when the sign of the statistic agrees with the
//! hypothesised direction; otherwise it is `1 - p/2`. Halving regardless of
//! sign would report strong evidence for an effect in the opposite direction
//! as support for the hypothesis.

use serde::{Deserialize, Serialize};

use crate::config::{Config, TestType};
use crate::error::{Error, Result};
use crate::gate::GateDecision;
use crate::interpret::{interpret, TestCategory};
use crate::sample::Sample;
use crate::testing::{one_sample_t_test, pooled_t_test, TestStatistic};

/// Directional or non-directional test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tail {
    /// Directional: the alternative is given by a [`Direction`].
    OneTailed,
    /// Non-directional: any difference counts.
    #[default]
    TwoTailed,
}

impl Tail {
    /// Configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            Tail::OneTailed => "one-tailed",
            Tail::TwoTailed => "two-tailed",
        }
    }
}

/// Alternative hypothesis of a one-tailed test.
///
/// `Greater` means the sample mean exceeds the population mean (one-sample)
/// or group 1's mean exceeds group 2's (two-sample).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// μ > μ₀, or μ₁ > μ₂.
    #[default]
    Greater,
    /// μ < μ₀, or μ₁ < μ₂.
    Less,
}

/// Result of the t-test. Exists only when the gate was open.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HypothesisOutcome {
    /// One- or two-sample.
    pub test_type: TestType,
    /// One- or two-tailed.
    pub tail: Tail,
    /// Alternative direction; `None` for two-tailed tests.
    pub direction: Option<Direction>,
    /// t statistic.
    pub statistic: f64,
    /// Degrees of freedom.
    pub df: f64,
    /// Tail-adjusted p-value.
    pub p_value: f64,
    /// The null of equal means is rejected (p < alpha).
    pub significant: bool,
    /// Human-readable conclusion.
    pub interpretation: String,
}

/// Converts a two-tailed p-value to the configured tail.
///
/// # Examples
///
/// ```
/// use u_hypothesis::engine::{adjust_tail, Direction, Tail};
///
/// assert_eq!(adjust_tail(0.04, 2.3, Tail::TwoTailed, Direction::Greater), 0.04);
/// assert_eq!(adjust_tail(0.04, 2.3, Tail::OneTailed, Direction::Greater), 0.02);
/// assert_eq!(adjust_tail(0.04, -2.3, Tail::OneTailed, Direction::Greater), 0.98);
/// assert_eq!(adjust_tail(0.04, -2.3, Tail::OneTailed, Direction::Less), 0.02);
/// ```
pub fn adjust_tail(p_two_tailed: f64, statistic: f64, tail: Tail, direction: Direction) -> f64 {
    match tail {
        Tail::TwoTailed => p_two_tailed,
        Tail::OneTailed => {
            let consistent = match direction {
                Direction::Greater => statistic > 0.0,
                Direction::Less => statistic < 0.0,
            };
            if consistent {
                p_two_tailed / 2.0
            } else {
                1.0 - p_two_tailed / 2.0
            }
        }
    }
}

fn conclude(raw: TestStatistic, test_type: TestType, config: &Config) -> Result<HypothesisOutcome> {
    let p_value = adjust_tail(raw.p_value, raw.statistic, config.tail, config.direction);
    let verdict = interpret(p_value, config.alpha, TestCategory::MeanComparison)?;
    Ok(HypothesisOutcome {
        test_type,
        tail: config.tail,
        direction: (config.tail == Tail::OneTailed).then_some(config.direction),
        statistic: raw.statistic,
        df: raw.df,
        p_value,
        significant: verdict.significant(),
        interpretation: verdict.interpretation.to_string(),
    })
}

/// One-sample t-test of `sample` against `config.population_mean`.
///
/// Returns `Ok(None)` when the gate is not open.
///
/// # Errors
///
/// - [`Error::Configuration`] if no population mean is configured. A mean of
///   `0.0` is a legitimate hypothesis, not "absent".
/// - [`Error::Data`] if the sample is empty.
/// - [`Error::Numerical`] if the t statistic cannot be computed (fewer than
///   two observations, zero variance).
pub fn one_sample(
    sample: &Sample,
    config: &Config,
    gate: GateDecision,
) -> Result<Option<HypothesisOutcome>> {
    let mu = config.population_mean.ok_or_else(|| {
        Error::Configuration("a population mean is required for a one-sample t-test".into())
    })?;
    if !gate.is_open() {
        return Ok(None);
    }
    if sample.is_empty() {
        return Err(Error::Data(format!("sample '{}' is empty", sample.label)));
    }

    let raw = one_sample_t_test(&sample.values, mu).ok_or_else(|| {
        Error::Numerical(format!(
            "one-sample t-test cannot be computed for '{}'",
            sample.label
        ))
    })?;
    conclude(raw, TestType::OneSample, config).map(Some)
}

/// Independent two-sample t-test of `a` against `b`.
///
/// Returns `Ok(None)` when the gate is not open.
///
/// # Errors
///
/// - [`Error::Data`] if either sample is empty.
/// - [`Error::Numerical`] if the t statistic cannot be computed.
pub fn two_sample(
    a: &Sample,
    b: &Sample,
    config: &Config,
    gate: GateDecision,
) -> Result<Option<HypothesisOutcome>> {
    if !gate.is_open() {
        return Ok(None);
    }
    for s in [a, b] {
        if s.is_empty() {
            return Err(Error::Data(format!("sample '{}' is empty", s.label)));
        }
    }

    let raw = pooled_t_test(&a.values, &b.values).ok_or_else(|| {
        Error::Numerical(format!(
            "two-sample t-test cannot be computed for '{}' and '{}'",
            a.label, b.label
        ))
    })?;
    conclude(raw, TestType::TwoSample, config).map(Some)
}
