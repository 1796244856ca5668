//! Labelled input samples.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An ordered sequence of observations with the label it was supplied under
/// (typically a CSV column header).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Display label.
    pub label: String,
    /// Observations, in input order.
    pub values: Vec<f64>,
}

impl Sample {
    /// Creates a labelled sample.
    pub fn new(label: impl Into<String>, values: impl Into<Vec<f64>>) -> Self {
        Self {
            label: label.into(),
            values: values.into(),
        }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` if the sample has no observations.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Rejects samples that no check could use.
    ///
    /// # Errors
    ///
    /// [`Error::Data`] if the sample is empty or holds a NaN or infinite
    /// value.
    pub fn validate(&self) -> Result<()> {
        if self.values.is_empty() {
            return Err(Error::Data(format!("sample '{}' is empty", self.label)));
        }
        if let Some(i) = self.values.iter().position(|v| !v.is_finite()) {
            return Err(Error::Data(format!(
                "sample '{}' has a non-finite value at position {i}",
                self.label
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_empty_and_non_finite() {
        assert!(Sample::new("a", vec![1.0, 2.0]).validate().is_ok());

        let err = Sample::new("a", Vec::new()).validate().unwrap_err();
        assert_eq!(err, Error::Data("sample 'a' is empty".into()));

        let err = Sample::new("b", vec![1.0, f64::INFINITY]).validate().unwrap_err();
        assert!(err.to_string().contains("position 1"), "{err}");
    }
}
