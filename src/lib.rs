//! # u-hypothesis
//!
//! Assumption-gated t-tests: check normality and homogeneity of variance,
//! and run the t-test only when those assumptions hold.
//!
//! This crate operates on raw labelled `f64` samples. Reading CSV files,
//! drawing figures and writing reports are left to the caller; every result
//! is a plain serializable structure.
//!
//! ## Modules
//!
//! - [`testing`]: Numeric routines (t-tests, Shapiro-Wilk, K², Bartlett, Levene)
//! - [`distribution`]: Kolmogorov-Smirnov, histogram bins, QQ-plot data
//! - [`interpret`]: p-value interpretation per test category
//! - [`suite`]: Batteries of assumption checks per group
//! - [`gate`]: Whether the t-test may run
//! - [`engine`]: The t-test itself, with tail adjustment
//! - [`compose`]: Run result and narrative
//! - [`report`]: Section/row/column table view of a run
//! - [`figures`]: Histogram and QQ-plot data per sample
//! - [`config`]: Run configuration
//!
//! ## Example
//!
//! ```
//! use u_hypothesis::{analyze, Config, GateDecision, Sample};
//!
//! let outlier = Sample::new("x", vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0]);
//! let run = analyze(&[outlier], &Config::one_sample(3.0)).unwrap();
//! assert_eq!(run.gate, GateDecision::BlockedNormalityGroup1);
//! assert!(run.outcome.is_none());
//! ```

pub mod compose;
pub mod config;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod figures;
pub mod gate;
pub mod interpret;
pub mod report;
pub mod sample;
pub mod suite;
pub mod testing;

pub use compose::{RunResult, SuiteKey};
pub use config::{Config, TestType};
pub use engine::{Direction, HypothesisOutcome, Tail};
pub use error::{Error, Result};
pub use gate::GateDecision;
pub use sample::Sample;

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::suite::{run_normality, run_variance_homogeneity, GroupSuiteResult, VarianceTest};

/// Runs the whole analysis: assumption suites, gate, t-test and result
/// composition.
///
/// Only the first one (one-sample) or two (two-sample) samples are used;
/// any further samples are ignored.
///
/// # Errors
///
/// - [`Error::Configuration`] if `config` cannot drive a run over
///   `samples`. Raised before any check runs.
/// - [`Error::Data`] if a used sample is empty, holds non-finite values, or
///   the two samples of a two-sample run differ in length.
/// - [`Error::Numerical`] if the gate is open but the t statistic cannot be
///   computed.
pub fn analyze(samples: &[Sample], config: &Config) -> Result<RunResult> {
    config.validate(samples.len())?;

    let needed = config.test_type.sample_count();
    let used = samples.get(..needed).ok_or_else(|| {
        Error::Configuration(format!(
            "expected {needed} samples, got {}",
            samples.len()
        ))
    })?;
    if samples.len() > needed {
        warn!(
            supplied = samples.len(),
            used = needed,
            "ignoring extra samples"
        );
    }
    for s in used {
        s.validate()?;
    }

    let mut suites = IndexMap::new();
    let (gate, outcome) = match used {
        [only] => {
            let g1 = run_normality(only, &config.normality_tests, config.alpha)?;
            let gate = gate::evaluate(&g1, None, None);
            suites.insert(SuiteKey::Group1, g1);
            (gate, engine::one_sample(only, config, gate)?)
        }
        [a, b] => {
            if a.len() != b.len() {
                return Err(Error::Data(format!(
                    "samples '{}' and '{}' differ in length ({} vs {})",
                    a.label,
                    b.label,
                    a.len(),
                    b.len()
                )));
            }
            let g1 = run_normality(a, &config.normality_tests, config.alpha)?;
            let g2 = run_normality(b, &config.normality_tests, config.alpha)?;
            warn_bartlett_precondition(config, [&g1, &g2]);
            let variance =
                run_variance_homogeneity(a, b, &config.variance_tests, config.alpha)?;

            let gate = gate::evaluate(&g1, Some(&g2), Some(&variance));
            suites.insert(SuiteKey::Group1, g1);
            suites.insert(SuiteKey::Group2, g2);
            suites.insert(SuiteKey::Variance, variance);
            (gate, engine::two_sample(a, b, config, gate)?)
        }
        _ => {
            return Err(Error::Configuration(format!(
                "unsupported sample count {needed}"
            )))
        }
    };

    info!(
        gate = ?gate,
        t_test_ran = outcome.is_some(),
        "analysis complete"
    );

    let labels = used.iter().map(|s| s.label.clone()).collect();
    Ok(compose::compose(config, suites, gate, outcome, labels))
}

fn warn_bartlett_precondition(config: &Config, groups: [&GroupSuiteResult; 2]) {
    if !VarianceTest::select(&config.variance_tests).contains(&VarianceTest::Bartlett) {
        return;
    }
    for g in groups.iter().filter(|g| !g.all_passed()) {
        warn!(
            group = %g.label,
            "bartletts assumes normal groups but this group failed normality"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::NOT_COMPUTABLE;
    use u_numflow::special;

    fn normal_quantiles(n: usize, mean: f64, sd: f64) -> Vec<f64> {
        (1..=n)
            .map(|i| mean + sd * special::inverse_normal_cdf((i as f64 - 0.5) / n as f64))
            .collect()
    }

    #[test]
    fn outlier_blocks_one_sample_run() {
        let cfg = Config {
            normality_tests: vec!["shapiro-wilks".into(), "k-squared".into()],
            ..Config::one_sample(3.0)
        };
        let s = Sample::new("x", vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0]);
        let run = analyze(&[s], &cfg).expect("runs");

        let g1 = run.suite(SuiteKey::Group1).expect("group 1 suite");
        assert!(!g1.all_passed());
        assert_eq!(run.gate, GateDecision::BlockedNormalityGroup1);
        assert!(run.outcome.is_none());
        assert!(run.narrative.contains("T-test not run"));
    }

    #[test]
    fn mirrored_normal_samples_open_the_gate() {
        let a = normal_quantiles(20, 10.0, 2.0);
        let mean = a.iter().sum::<f64>() / a.len() as f64;
        let b: Vec<f64> = a.iter().rev().map(|x| 2.0 * mean - x).collect();

        let run = analyze(
            &[Sample::new("a", a), Sample::new("b", b)],
            &Config::two_sample(),
        )
        .expect("runs");

        for key in [SuiteKey::Group1, SuiteKey::Group2, SuiteKey::Variance] {
            let suite = run.suite(key).expect("suite present");
            assert!(suite.all_passed(), "{key:?} failed: {:?}", suite.failed());
        }
        assert_eq!(run.gate, GateDecision::Open);
        let outcome = run.outcome.expect("t-test ran");
        assert!(!outcome.significant, "p = {}", outcome.p_value);
        assert!(outcome.p_value > 0.99, "p = {}", outcome.p_value);
        assert_eq!(outcome.df, 38.0);
    }

    #[test]
    fn one_sample_without_mean_is_a_configuration_error() {
        let cfg = Config {
            test_type: TestType::OneSample,
            population_mean: None,
            ..Config::default()
        };
        let s = Sample::new("x", normal_quantiles(10, 0.0, 1.0));
        assert!(matches!(analyze(&[s], &cfg), Err(Error::Configuration(_))));
    }

    #[test]
    fn zero_is_a_valid_population_mean() {
        let s = Sample::new("x", normal_quantiles(15, 0.0, 1.0));
        let run = analyze(&[s], &Config::one_sample(0.0)).expect("runs");
        assert_eq!(run.gate, GateDecision::Open);
        let outcome = run.outcome.expect("t-test ran");
        assert!(!outcome.significant, "p = {}", outcome.p_value);
    }

    #[test]
    fn tiny_sample_degrades_per_test() {
        let cfg = Config {
            normality_tests: vec!["shapiro-wilks".into(), "k-squared".into()],
            ..Config::one_sample(1.0)
        };
        let run = analyze(&[Sample::new("x", vec![1.0, 2.0])], &cfg).expect("runs");
        let g1 = run.suite(SuiteKey::Group1).expect("group 1 suite");
        assert_eq!(g1.results.len(), 2);
        for r in g1.results.values() {
            assert!(!r.passed);
            assert_eq!(r.interpretation, NOT_COMPUTABLE);
        }
        assert_eq!(run.gate, GateDecision::BlockedNormalityGroup1);
    }

    #[test]
    fn uncomputable_check_does_not_stop_the_others() {
        let cfg = Config {
            normality_tests: vec!["k-squared".into(), "shapiro-wilks".into()],
            ..Config::one_sample(5.0)
        };
        let s = Sample::new("x", vec![4.0, 5.5, 5.0, 4.5, 6.0, 5.2]);
        let run = analyze(&[s], &cfg).expect("runs");
        let g1 = run.suite(SuiteKey::Group1).expect("group 1 suite");
        assert!(!g1.results["k-squared"].is_computable());
        assert!(g1.results["shapiro-wilks"].is_computable());
        assert!(g1.results["shapiro-wilks"].p_value.is_finite());
    }

    #[test]
    fn data_errors() {
        let cfg = Config::two_sample();
        let a = Sample::new("a", vec![1.0, 2.0, 3.0]);
        let empty = Sample::new("b", Vec::new());
        assert!(matches!(
            analyze(&[a.clone(), empty], &cfg),
            Err(Error::Data(_))
        ));

        let short = Sample::new("c", vec![1.0, 2.0]);
        assert!(matches!(analyze(&[a.clone(), short], &cfg), Err(Error::Data(_))));

        let nan = Sample::new("d", vec![1.0, f64::NAN, 3.0]);
        assert!(matches!(analyze(&[a, nan], &cfg), Err(Error::Data(_))));
    }

    #[test]
    fn two_sample_needs_two_samples() {
        let a = Sample::new("a", vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            analyze(&[a], &Config::two_sample()),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn extra_samples_are_ignored() {
        let a = Sample::new("a", normal_quantiles(12, 5.0, 1.0));
        let extra = Sample::new("z", vec![f64::NAN]);
        let run = analyze(&[a, extra], &Config::one_sample(5.0)).expect("runs");
        assert_eq!(run.labels, vec!["a".to_string()]);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let a = normal_quantiles(16, 3.0, 1.0);
        let b = normal_quantiles(16, 3.5, 1.0);
        let samples = [Sample::new("a", a), Sample::new("b", b)];
        let cfg = Config::two_sample();

        let first = analyze(&samples, &cfg).expect("runs");
        let second = analyze(&samples, &cfg).expect("runs");
        assert_eq!(
            first.to_json().expect("serializes"),
            second.to_json().expect("serializes")
        );
    }
}
