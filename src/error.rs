//! Error types for the motion fusion library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Calibration could not be completed (not enough buffered samples).
    /// Recoverable: keep collecting and retry.
    #[error("Calibration error: {0}")]
    Calibration(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed input at the ingestion boundary
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
