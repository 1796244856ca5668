//! Error taxonomy.
//!
//! Configuration and data errors abort a run. Numerical errors are raised by
//! a single statistical check and recovered at that check's scope by the
//! assumption suite. A blocked gate is not an error at all; it is reported in
//! [`RunResult`](crate::compose::RunResult).

use thiserror::Error;

/// Errors raised by the analysis pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The requested analysis cannot be configured as given.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Input samples are malformed (empty, non-finite, mismatched).
    #[error("data error: {0}")]
    Data(String),

    /// A statistical routine could not produce a valid statistic or p-value.
    #[error("numerical error: {0}")]
    Numerical(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
