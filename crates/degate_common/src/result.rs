//! Common result and error types.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates a violated invariant (a bug in degate or a pass fed a
/// shape it must never see), not a user-facing problem. User-facing problems
/// are reported as diagnostics or as the owning crate's error type.
pub type DegateResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug, not a user input problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
