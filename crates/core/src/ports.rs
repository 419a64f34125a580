//! Collaborator interfaces consumed by the engine.
//!
//! Storage, allocation, policy, and progress data live outside this crate.
//! Implementations must be `Send + Sync` so a single service can be shared
//! across concurrent requests.

use async_trait::async_trait;
use chrono::NaiveDate;
use costline_shared::types::{ActualCostId, BaselineId, Period, ProjectId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::budget::lifecycle::ApprovalCommit;
use crate::budget::types::{ActualCost, BudgetBaseline};
use crate::derivation::AllocationRecord;
use crate::policy::EffectiveBudgetPolicy;

/// Errors reported by a [`BudgetStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Baseline not found.
    #[error("Baseline not found: {0}")]
    BaselineNotFound(BaselineId),

    /// Actual cost not found.
    #[error("Actual cost not found: {0}")]
    ActualNotFound(ActualCostId),

    /// The project's approved baseline changed since it was read.
    #[error("Approved baseline for project {project_id} changed concurrently")]
    ApprovalConflict {
        /// Project whose approval raced.
        project_id: ProjectId,
    },

    /// The baseline is no longer a draft.
    #[error("Baseline {0} is no longer a draft")]
    NotDraft(BaselineId),

    /// A uniqueness constraint was violated.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Backend failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Errors reported by the allocation, policy, or progress collaborators.
#[derive(Debug, Error)]
#[error("{collaborator} unavailable: {message}")]
pub struct ProviderError {
    /// Which collaborator failed.
    pub collaborator: &'static str,
    /// Failure description.
    pub message: String,
}

/// Baseline and actual cost storage.
///
/// Implementations must guarantee:
/// - at most one `Approved` and at most one `Draft` baseline per project;
/// - unique `(project_id, version_number)`;
/// - [`BudgetStore::commit_approval`] applies both rows atomically or not at all.
#[async_trait]
pub trait BudgetStore: Send + Sync {
    /// Inserts a new baseline.
    async fn insert_baseline(&self, baseline: BudgetBaseline) -> Result<(), StoreError>;

    /// Fetches a baseline by id.
    async fn get_baseline(&self, id: BaselineId) -> Result<Option<BudgetBaseline>, StoreError>;

    /// Lists a project's baselines ordered by ascending version number.
    async fn list_baselines(&self, project_id: ProjectId)
    -> Result<Vec<BudgetBaseline>, StoreError>;

    /// Replaces a draft baseline. Fails with [`StoreError::NotDraft`] if the
    /// stored row is no longer a draft.
    async fn save_draft(&self, baseline: BudgetBaseline) -> Result<(), StoreError>;

    /// Deletes a draft baseline. Fails with [`StoreError::NotDraft`] if the
    /// stored row is no longer a draft.
    async fn delete_draft(&self, id: BaselineId) -> Result<(), StoreError>;

    /// Atomically supersedes the project's approved baseline (if any) and
    /// approves the draft.
    ///
    /// Fails with [`StoreError::ApprovalConflict`] when the project's current
    /// approved baseline is not [`ApprovalCommit::expected_current`] or the
    /// stored draft changed since the commit was built
    /// ([`ApprovalCommit::matches_draft`]), and with [`StoreError::NotDraft`]
    /// when the target is no longer a draft.
    async fn commit_approval(&self, commit: ApprovalCommit) -> Result<(), StoreError>;

    /// Inserts an actual cost.
    async fn insert_actual(&self, actual: ActualCost) -> Result<(), StoreError>;

    /// Fetches an actual cost by id.
    async fn get_actual(&self, id: ActualCostId) -> Result<Option<ActualCost>, StoreError>;

    /// Replaces an actual cost.
    async fn update_actual(&self, actual: ActualCost) -> Result<(), StoreError>;

    /// Deletes an actual cost.
    async fn delete_actual(&self, id: ActualCostId) -> Result<(), StoreError>;

    /// Lists a project's actual costs, optionally only those overlapping `period`.
    async fn list_actuals(
        &self,
        project_id: ProjectId,
        period: Option<Period>,
    ) -> Result<Vec<ActualCost>, StoreError>;
}

/// Source of weekly resource allocations.
#[async_trait]
pub trait AllocationProvider: Send + Sync {
    /// Returns allocation lines for weeks touching `[period_start, period_end]`.
    async fn allocations(
        &self,
        project_id: ProjectId,
        period: Period,
    ) -> Result<Vec<AllocationRecord>, ProviderError>;
}

/// Source of the effective (already hierarchy-resolved) budget policy.
#[async_trait]
pub trait PolicyResolver: Send + Sync {
    /// Returns the project's effective policy.
    async fn effective_policy(
        &self,
        project_id: ProjectId,
    ) -> Result<EffectiveBudgetPolicy, ProviderError>;
}

/// Source of schedule progress.
#[async_trait]
pub trait ProgressProvider: Send + Sync {
    /// Fraction of work complete in `[0, 1]`, if known.
    async fn percent_complete(&self, project_id: ProjectId)
    -> Result<Option<Decimal>, ProviderError>;

    /// Planned value as of `as_of`, if known.
    async fn planned_value(
        &self,
        project_id: ProjectId,
        as_of: NaiveDate,
    ) -> Result<Option<Decimal>, ProviderError>;
}
