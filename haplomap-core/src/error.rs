//! Structured error types for haplomap.

use thiserror::Error;

/// Unified error type for all haplomap operations.
///
/// The estimation pipeline itself never produces one of these. Errors come
/// from the boundaries around it: configuration, parsing, file access.
#[derive(Debug, Error)]
pub enum HaplomapError {
    /// I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error (malformed observation or config data)
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid input (bad arguments, out-of-range values)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout haplomap.
pub type Result<T> = std::result::Result<T, HaplomapError>;
