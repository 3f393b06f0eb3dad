//! Error types for workflow operations.

use super::oracle::OracleError;

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Error types for workflow operations.
///
/// Cache I/O problems never surface here; they are logged and absorbed by
/// the cache itself. A path that cannot be found is `Ok(None)`, not an error.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Issue tracker error: {0}")]
    Oracle(#[from] OracleError),
}

/// Reject empty or whitespace-only arguments before touching the tracker.
pub(crate) fn require(value: &str, what: &str) -> WorkflowResult<()> {
    if value.trim().is_empty() {
        return Err(WorkflowError::InvalidInput(format!("{} must not be empty", what)));
    }
    Ok(())
}
