//! Workspace-wide error types.

use thiserror::Error;

/// Application error types surfaced to callers of the engine.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation not allowed in the entity's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A concurrent approval won the race; re-read and retry.
    #[error("Approval conflict: {0}")]
    ApprovalConflict(String),

    /// Conflict with a concurrent write other than approval.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage collaborator error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Allocation, policy, or progress collaborator error.
    #[error("External service error: {0}")]
    ExternalService(String),
}

impl AppError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::ApprovalConflict(_) => "APPROVAL_CONFLICT",
            Self::Conflict(_) => "CONFLICT",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
        }
    }

    /// Returns true if the caller may retry after re-reading state.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ApprovalConflict(_) | Self::Conflict(_))
    }
}
