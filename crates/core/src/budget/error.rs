//! Budget error types.

use costline_shared::AppError;
use costline_shared::types::{ActualCostId, BaselineId, InvalidPeriod, ProjectId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::BaselineStatus;
use crate::derivation::{DerivationError, UnavailableReason};
use crate::ports::{ProviderError, StoreError};

/// Budget-related errors.
#[derive(Debug, Error)]
pub enum BudgetError {
    /// Baseline not found.
    #[error("Baseline not found: {0}")]
    BaselineNotFound(BaselineId),

    /// Actual cost not found.
    #[error("Actual cost not found: {0}")]
    ActualNotFound(ActualCostId),

    /// Baseline total must be positive.
    #[error("Baseline total must be positive, got {0}")]
    NonPositiveBaselineTotal(Decimal),

    /// Actual total cannot be negative.
    #[error("Actual total cannot be negative, got {0}")]
    NegativeActualTotal(Decimal),

    /// A category amount is negative.
    #[error("Amount for category '{category}' cannot be negative, got {amount}")]
    NegativeCategoryAmount {
        /// Category name.
        category: String,
        /// Offending amount.
        amount: Decimal,
    },

    /// Period start falls after its end.
    #[error(transparent)]
    InvalidPeriod(#[from] InvalidPeriod),

    /// Allocation data failed validation during derivation.
    #[error(transparent)]
    Derivation(#[from] DerivationError),

    /// Operation not allowed in the baseline's current status.
    #[error("Cannot {action} baseline {baseline_id} in status {status}")]
    InvalidState {
        /// Baseline.
        baseline_id: BaselineId,
        /// Its current status.
        status: BaselineStatus,
        /// Attempted action.
        action: &'static str,
    },

    /// The project already has an open draft.
    #[error("Project {project_id} already has draft baseline {draft_id}")]
    DraftAlreadyExists {
        /// Project.
        project_id: ProjectId,
        /// Existing draft.
        draft_id: BaselineId,
    },

    /// Cost derivation is disabled by policy.
    #[error("Cost derivation unavailable for project {project_id}: {reason:?}")]
    DerivationUnavailable {
        /// Project.
        project_id: ProjectId,
        /// Reason.
        reason: UnavailableReason,
    },

    /// A concurrent approval for the project completed first.
    #[error("Concurrent approval for project {0} completed first; re-read and retry")]
    ApprovalConflict(ProjectId),

    /// Another concurrent write conflicted with this one.
    #[error("Concurrent modification: {0}")]
    Conflict(String),

    /// Storage collaborator failure.
    #[error("Storage error: {0}")]
    Store(String),

    /// Allocation, policy, or progress collaborator failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl BudgetError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::BaselineNotFound(_) => "BASELINE_NOT_FOUND",
            Self::ActualNotFound(_) => "ACTUAL_NOT_FOUND",
            Self::NonPositiveBaselineTotal(_) => "NON_POSITIVE_BASELINE_TOTAL",
            Self::NegativeActualTotal(_) => "NEGATIVE_ACTUAL_TOTAL",
            Self::NegativeCategoryAmount { .. } => "NEGATIVE_CATEGORY_AMOUNT",
            Self::InvalidPeriod(_) => "INVALID_PERIOD",
            Self::Derivation(err) => err.error_code(),
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::DraftAlreadyExists { .. } => "DRAFT_ALREADY_EXISTS",
            Self::DerivationUnavailable { .. } => "DERIVATION_UNAVAILABLE",
            Self::ApprovalConflict(_) => "APPROVAL_CONFLICT",
            Self::Conflict(_) => "CONFLICT",
            Self::Store(_) => "STORAGE_ERROR",
            Self::Provider(_) => "PROVIDER_ERROR",
        }
    }
}

impl From<StoreError> for BudgetError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::BaselineNotFound(id) => Self::BaselineNotFound(id),
            StoreError::ActualNotFound(id) => Self::ActualNotFound(id),
            StoreError::ApprovalConflict { project_id } => Self::ApprovalConflict(project_id),
            StoreError::NotDraft(_) | StoreError::UniqueViolation(_) => {
                Self::Conflict(err.to_string())
            }
            StoreError::Backend(message) => Self::Store(message),
        }
    }
}

impl From<BudgetError> for AppError {
    fn from(err: BudgetError) -> Self {
        let message = err.to_string();
        match err {
            BudgetError::BaselineNotFound(_) | BudgetError::ActualNotFound(_) => {
                Self::NotFound(message)
            }
            BudgetError::NonPositiveBaselineTotal(_)
            | BudgetError::NegativeActualTotal(_)
            | BudgetError::NegativeCategoryAmount { .. }
            | BudgetError::InvalidPeriod(_)
            | BudgetError::Derivation(_) => Self::Validation(message),
            BudgetError::InvalidState { .. }
            | BudgetError::DraftAlreadyExists { .. }
            | BudgetError::DerivationUnavailable { .. } => Self::InvalidState(message),
            BudgetError::ApprovalConflict(_) => Self::ApprovalConflict(message),
            BudgetError::Conflict(_) => Self::Conflict(message),
            BudgetError::Store(_) => Self::Storage(message),
            BudgetError::Provider(_) => Self::ExternalService(message),
        }
    }
}
