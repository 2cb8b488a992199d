//! Error type of the crate.

/// Result type with [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors of the motion algebra, synthesis and mechanism analysis.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Wrong length of an input vector or matrix.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    Dimension {
        /// Expected length
        expected: usize,
        /// Actual length
        got: usize,
    },
    /// An argument is outside the supported domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A linear system has no unique solution.
    #[error("singular linear system")]
    Singular,
    /// Interpolation has no solution for the given data.
    #[error("interpolation failed: {0}")]
    Interpolation(String),
    /// The motion polynomial cannot be factorized.
    #[error("factorization failed: {0}")]
    Factorization(String),
    /// Components disagree with each other.
    #[error("mismatch: {0}")]
    Mismatch(String),
    /// File access error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Deserialization error of a saved mechanism.
    #[cfg(feature = "serde")]
    #[error(transparent)]
    Ron(#[from] ron::error::SpannedError),
    /// Serialization error of a mechanism.
    #[cfg(feature = "serde")]
    #[error(transparent)]
    RonWrite(#[from] ron::Error),
    /// Error of the CSV reader or writer.
    #[cfg(feature = "csv")]
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
