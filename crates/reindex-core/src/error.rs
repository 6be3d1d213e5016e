//! Error types for the mapping-and-ordering engine.

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors the engine can surface.
///
/// The engine never retries and never partially succeeds: it either returns a
/// complete grouped structure or one of these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Input shape makes the mapping impossible (e.g. empty chapter list)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An upstream collaborator handed over data violating its contract
    #[error("Precondition violation: {0}")]
    PreconditionViolation(String),
}
