//! p-value interpretation.
//!
//! Turns a `(p, alpha, category)` triple into a verdict. The polarity depends
//! on the category:
//!
//! | Category              | Null hypothesis        | Outcome flag            |
//! |-----------------------|------------------------|-------------------------|
//! | `Normality`           | sample is normal       | passed = p ≥ α          |
//! | `VarianceHomogeneity` | variances are equal    | passed = p ≥ α          |
//! | `MeanComparison`      | means are equal        | significant = p < α     |
//!
//! For the assumption categories the interesting outcome is *keeping* the
//! null; for the mean comparison it is *rejecting* it.
//!
//! # Examples
//!
//! ```
//! use u_hypothesis::interpret::{interpret, TestCategory};
//!
//! let v = interpret(0.20, 0.05, TestCategory::Normality).unwrap();
//! assert!(v.passed());
//! assert_eq!(v.interpretation, "likely normally distributed");
//!
//! let v = interpret(0.01, 0.05, TestCategory::MeanComparison).unwrap();
//! assert!(v.significant());
//! assert_eq!(v.interpretation, "likely NOT from the same population");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Family a statistical check belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestCategory {
    /// Null: the sample is drawn from a normal distribution.
    Normality,
    /// Null: the samples share a common variance.
    VarianceHomogeneity,
    /// Null: the samples share a population mean.
    MeanComparison,
}

impl TestCategory {
    /// Interpretation texts as `(null kept, null rejected)`.
    fn texts(self) -> (&'static str, &'static str) {
        match self {
            TestCategory::Normality => (
                "likely normally distributed",
                "likely NOT normally distributed",
            ),
            TestCategory::VarianceHomogeneity => ("likely homogeneous", "likely NOT homogeneous"),
            TestCategory::MeanComparison => (
                "likely from the same population",
                "likely NOT from the same population",
            ),
        }
    }
}

/// Outcome of interpreting one p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Category the p-value was interpreted under.
    pub category: TestCategory,
    /// `p < alpha`: the null hypothesis is rejected.
    pub rejects_null: bool,
    /// Human-readable interpretation.
    pub interpretation: &'static str,
}

impl Verdict {
    /// The category's outcome flag: the assumption held (null kept) for
    /// `Normality` and `VarianceHomogeneity`, the difference is significant
    /// (null rejected) for `MeanComparison`.
    pub fn passed(&self) -> bool {
        match self.category {
            TestCategory::Normality | TestCategory::VarianceHomogeneity => !self.rejects_null,
            TestCategory::MeanComparison => self.rejects_null,
        }
    }

    /// The means differ significantly (null of equal means rejected).
    pub fn significant(&self) -> bool {
        self.rejects_null
    }
}

/// Interprets a p-value against a significance threshold.
///
/// # Errors
///
/// - [`Error::Configuration`] if `alpha` is not inside (0, 1).
/// - [`Error::Numerical`] if `p` is outside [0, 1] or NaN; an out-of-range
///   p-value is a defect of the routine that produced it and is never
///   clamped here.
pub fn interpret(p: f64, alpha: f64, category: TestCategory) -> Result<Verdict> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(Error::Configuration(format!(
            "alpha must lie strictly between 0 and 1, got {alpha}"
        )));
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::Numerical(format!("p-value {p} outside [0, 1]")));
    }

    let rejects_null = p < alpha;
    let (kept, rejected) = category.texts();
    Ok(Verdict {
        category,
        rejects_null,
        interpretation: if rejects_null { rejected } else { kept },
    })
}
