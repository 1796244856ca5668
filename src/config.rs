//! Run configuration.
//!
//! A [`Config`] is built fresh for every analysis and threaded through the
//! whole run; nothing here is process-wide. Test selections are kept as raw
//! names so that names this version does not recognise survive
//! deserialization and are skipped by the suite instead of failing the load.
//!
//! # Examples
//!
//! ```
//! use u_hypothesis::config::{Config, TestType};
//! use u_hypothesis::engine::Tail;
//!
//! let cfg = Config::from_json_str(r#"{
//!     "test_type": "one-sample",
//!     "population_mean": 0.0,
//!     "tail": "one-tailed",
//!     "normality_tests": ["shapiro-wilks", "kolmogorov-smirnov"]
//! }"#).unwrap();
//! assert_eq!(cfg.test_type, TestType::OneSample);
//! assert_eq!(cfg.population_mean, Some(0.0));
//! assert_eq!(cfg.tail, Tail::OneTailed);
//! assert_eq!(cfg.alpha, 0.05);
//! ```

use serde::{Deserialize, Serialize};

use crate::engine::{Direction, Tail};
use crate::error::{Error, Result};
use crate::suite::{NormalityTest, VarianceTest};

/// Significance threshold used when none is configured.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Which t-test the run is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestType {
    /// One sample against a hypothesised population mean.
    OneSample,
    /// Two independent samples against each other.
    #[default]
    TwoSample,
}

impl TestType {
    /// Number of samples the test consumes.
    pub fn sample_count(self) -> usize {
        match self {
            TestType::OneSample => 1,
            TestType::TwoSample => 2,
        }
    }
}

/// Configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Normality checks to run on every sample, in order.
    pub normality_tests: Vec<String>,
    /// Variance-homogeneity checks to run across the two samples, in order.
    pub variance_tests: Vec<String>,
    /// Significance threshold shared by every check and the t-test.
    pub alpha: f64,
    /// One- or two-tailed t-test.
    pub tail: Tail,
    /// Alternative hypothesis direction for a one-tailed test.
    pub direction: Direction,
    /// One- or two-sample t-test.
    pub test_type: TestType,
    /// Hypothesised population mean; required for one-sample runs.
    pub population_mean: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            normality_tests: vec![
                NormalityTest::ShapiroWilk.as_str().to_string(),
                NormalityTest::KSquared.as_str().to_string(),
            ],
            variance_tests: vec![VarianceTest::Levene.as_str().to_string()],
            alpha: DEFAULT_ALPHA,
            tail: Tail::default(),
            direction: Direction::default(),
            test_type: TestType::default(),
            population_mean: None,
        }
    }
}

impl Config {
    /// Default checks for a one-sample test against `population_mean`.
    pub fn one_sample(population_mean: f64) -> Self {
        Self {
            test_type: TestType::OneSample,
            population_mean: Some(population_mean),
            ..Self::default()
        }
    }

    /// Default checks for a two-sample test.
    pub fn two_sample() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if the JSON is malformed or a field has the
    /// wrong shape. The result is not validated; see [`Config::validate`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Configuration(format!("invalid configuration: {e}")))
    }

    /// Checks that the configuration can drive a run over `sample_count`
    /// samples.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if alpha is outside (0, 1), a one-sample run
    /// has no (or a non-finite) population mean, a two-sample run has fewer
    /// than two samples, or a category required by the test type has no
    /// recognised test selected.
    pub fn validate(&self, sample_count: usize) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(Error::Configuration(format!(
                "alpha must lie strictly between 0 and 1, got {}",
                self.alpha
            )));
        }

        match self.test_type {
            TestType::OneSample => match self.population_mean {
                None => {
                    return Err(Error::Configuration(
                        "a population mean is required for a one-sample t-test".into(),
                    ))
                }
                Some(mu) if !mu.is_finite() => {
                    return Err(Error::Configuration(format!(
                        "population mean must be finite, got {mu}"
                    )))
                }
                Some(_) => {}
            },
            TestType::TwoSample => {
                if sample_count < 2 {
                    return Err(Error::Configuration(format!(
                        "a two-sample t-test needs two samples, got {sample_count}"
                    )));
                }
                if VarianceTest::select(&self.variance_tests).is_empty() {
                    return Err(Error::Configuration(
                        "no variance-homogeneity test selected for a two-sample run".into(),
                    ));
                }
            }
        }

        if sample_count == 0 {
            return Err(Error::Configuration("no samples supplied".into()));
        }
        if NormalityTest::select(&self.normality_tests).is_empty() {
            return Err(Error::Configuration("no normality test selected".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.alpha, 0.05);
        assert_eq!(cfg.tail, Tail::TwoTailed);
        assert_eq!(cfg.test_type, TestType::TwoSample);
        assert_eq!(cfg.population_mean, None);
        assert_eq!(cfg.normality_tests, vec!["shapiro-wilks", "k-squared"]);
        assert_eq!(cfg.variance_tests, vec!["levenes"]);
    }

    #[test]
    fn each_default_is_a_fresh_value() {
        let mut a = Config::default();
        a.normality_tests.push("kolmogorov-smirnov".into());
        let b = Config::default();
        assert_eq!(b.normality_tests.len(), 2);
    }

    #[test]
    fn one_sample_without_mean_is_rejected() {
        let cfg = Config {
            test_type: TestType::OneSample,
            ..Config::default()
        };
        let err = cfg.validate(1).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)), "{err}");
    }

    #[test]
    fn zero_mean_is_a_valid_hypothesis() {
        assert!(Config::one_sample(0.0).validate(1).is_ok());
        assert!(Config::one_sample(f64::NAN).validate(1).is_err());
    }

    #[test]
    fn two_sample_needs_two_samples() {
        assert!(Config::two_sample().validate(1).is_err());
        assert!(Config::two_sample().validate(2).is_ok());
    }

    #[test]
    fn empty_or_unknown_selection_is_rejected() {
        let cfg = Config {
            normality_tests: vec!["anderson-darling".into()],
            ..Config::default()
        };
        assert!(cfg.validate(2).is_err());

        let cfg = Config {
            variance_tests: Vec::new(),
            ..Config::default()
        };
        assert!(cfg.validate(2).is_err());

        // variance tests are irrelevant for one-sample runs
        let cfg = Config {
            variance_tests: Vec::new(),
            ..Config::one_sample(3.0)
        };
        assert!(cfg.validate(1).is_ok());
    }

    #[test]
    fn alpha_bounds() {
        for alpha in [0.0, 1.0, 1.5, f64::NAN] {
            let cfg = Config {
                alpha,
                ..Config::default()
            };
            assert!(cfg.validate(2).is_err(), "alpha = {alpha}");
        }
    }

    #[test]
    fn json_roundtrip_keeps_kebab_case() {
        let cfg = Config::one_sample(1.5);
        let json = serde_json::to_string(&cfg).expect("serializes");
        assert!(json.contains("\"one-sample\""), "{json}");
        assert!(json.contains("\"two-tailed\""), "{json}");
        assert_eq!(Config::from_json_str(&json).expect("parses"), cfg);
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        let err = Config::from_json_str("{\"alpha\": \"high\"}").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
