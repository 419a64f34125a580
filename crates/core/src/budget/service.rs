//! Budget service orchestrating lifecycle, summaries, and cost suggestions.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use costline_shared::EngineConfig;
use costline_shared::types::{ActualCostId, BaselineId, Period, ProjectId, UserId};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use super::error::BudgetError;
use super::lifecycle::BaselineLifecycle;
use super::summary::{BudgetSummaryAssembler, ProgressSnapshot};
use super::types::{
    ActualCost, ActualSource, BudgetBaseline, BudgetSummary, CategoryAmounts, CostSuggestion,
    CreateActualInput, CreateBaselineInput, UpdateActualInput, UpdateBaselineInput,
};
use crate::derivation::{
    AlignmentTolerance, CostComparisonEngine, CostDerivationEngine, DerivationOutcome,
    DerivedCostSuggestion, SuggestionCache, UnavailableReason,
};
use crate::ports::{AllocationProvider, BudgetStore, PolicyResolver, ProgressProvider, StoreError};

/// Category under which accepted cost suggestions are recorded.
pub const DERIVED_COST_CATEGORY: &str = "labor";

/// External collaborators the service reads from and writes to.
#[derive(Clone)]
pub struct Collaborators {
    /// Baseline and actual cost storage.
    pub store: Arc<dyn BudgetStore>,
    /// Weekly allocation source.
    pub allocations: Arc<dyn AllocationProvider>,
    /// Effective policy source.
    pub policies: Arc<dyn PolicyResolver>,
    /// Schedule progress source.
    pub progress: Arc<dyn ProgressProvider>,
}

/// Budget service exposing the engine's operations.
///
/// Cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct BudgetService {
    collaborators: Collaborators,
    derivation: Arc<CostDerivationEngine>,
    comparison: CostComparisonEngine,
    cache: SuggestionCache,
}

impl BudgetService {
    /// Creates a service with default tolerance and cache settings.
    #[must_use]
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            collaborators,
            derivation: Arc::new(CostDerivationEngine::new()),
            comparison: CostComparisonEngine::default(),
            cache: SuggestionCache::new(),
        }
    }

    /// Creates a service tuned by engine configuration.
    #[must_use]
    pub fn from_config(collaborators: Collaborators, config: &EngineConfig) -> Self {
        Self {
            collaborators,
            derivation: Arc::new(CostDerivationEngine::new()),
            comparison: CostComparisonEngine::new(AlignmentTolerance {
                percent: config.aligned_tolerance_percent,
                floor: config.aligned_tolerance_floor,
            }),
            cache: SuggestionCache::with_config(
                config.suggestion_cache_capacity,
                config.suggestion_cache_ttl_secs,
            ),
        }
    }

    /// Returns the suggestion cache.
    #[must_use]
    pub const fn cache(&self) -> &SuggestionCache {
        &self.cache
    }

    /// Assembles the budget summary for a project.
    ///
    /// # Errors
    ///
    /// Returns an error if a collaborator fails.
    #[instrument(skip(self), fields(project_id = %project_id))]
    pub async fn get_summary(&self, project_id: ProjectId) -> Result<BudgetSummary, BudgetError> {
        let store = &self.collaborators.store;
        let baselines = store.list_baselines(project_id).await?;
        let actuals = store.list_actuals(project_id, None).await?;

        let evm_possible = BudgetSummaryAssembler::current_baseline(&baselines)
            .is_some_and(|baseline| baseline.baseline_total > Decimal::ZERO);
        if !evm_possible {
            return Ok(BudgetSummaryAssembler::assemble(
                project_id,
                &baselines,
                actuals,
                None,
                ProgressSnapshot::default(),
            ));
        }

        let policy = self
            .collaborators
            .policies
            .effective_policy(project_id)
            .await?;
        let progress = self
            .progress_snapshot(project_id, policy.forecasting_rules.spi_enabled)
            .await?;

        Ok(BudgetSummaryAssembler::assemble(
            project_id,
            &baselines,
            actuals,
            Some(&policy),
            progress,
        ))
    }

    /// Creates a draft baseline with the next version number.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive total or negative category
    /// amount, and [`BudgetError::DraftAlreadyExists`] if a draft is open.
    #[instrument(skip(self, input), fields(project_id = %input.project_id))]
    pub async fn create_baseline(
        &self,
        input: CreateBaselineInput,
    ) -> Result<BudgetBaseline, BudgetError> {
        let store = &self.collaborators.store;
        let existing = store.list_baselines(input.project_id).await?;
        let baseline = BaselineLifecycle::create(input, &existing, Utc::now())?;

        store.insert_baseline(baseline.clone()).await?;
        info!(
            baseline_id = %baseline.id,
            version = baseline.version_number,
            "Baseline draft created"
        );

        Ok(baseline)
    }

    /// Updates a draft baseline.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError::BaselineNotFound`], [`BudgetError::InvalidState`]
    /// for a non-draft, or a validation error.
    #[instrument(skip(self, input), fields(baseline_id = %id))]
    pub async fn update_baseline(
        &self,
        id: BaselineId,
        input: UpdateBaselineInput,
    ) -> Result<BudgetBaseline, BudgetError> {
        let baseline = self.get_baseline(id).await?;
        let updated = BaselineLifecycle::update(&baseline, input, Utc::now())?;

        self.collaborators.store.save_draft(updated.clone()).await?;
        info!(version = updated.version_number, "Baseline draft updated");

        Ok(updated)
    }

    /// Approves a draft, superseding the project's current approved baseline.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError::InvalidState`] for a non-draft and
    /// [`BudgetError::ApprovalConflict`] when a concurrent approval won, when
    /// the draft was edited mid-approval, or when the target was approved by
    /// another caller after this call started.
    #[instrument(skip(self), fields(baseline_id = %id, approver = %approver))]
    pub async fn approve_baseline(
        &self,
        id: BaselineId,
        approver: UserId,
    ) -> Result<BudgetBaseline, BudgetError> {
        let store = &self.collaborators.store;
        let started = Utc::now();
        let target = self.get_baseline(id).await?;
        let existing = store.list_baselines(target.project_id).await?;
        if BaselineLifecycle::lost_approval_race(&target, &existing, started) {
            warn!(status = %target.status, "Baseline approved concurrently before read");
            return Err(BudgetError::ApprovalConflict(target.project_id));
        }
        let commit = BaselineLifecycle::approve(&target, &existing, approver, Utc::now())?;
        let superseded = commit.expected_current();
        let approved = commit.approved.clone();

        match store.commit_approval(commit).await {
            Ok(()) => {}
            Err(err @ (StoreError::ApprovalConflict { .. } | StoreError::NotDraft(_))) => {
                warn!(error = %err, "Baseline approval lost a concurrent race");
                return Err(BudgetError::ApprovalConflict(target.project_id));
            }
            Err(err) => return Err(err.into()),
        }

        info!(
            project_id = %approved.project_id,
            version = approved.version_number,
            superseded = ?superseded,
            "Baseline approved"
        );
        Ok(approved)
    }

    /// Deletes a draft baseline.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError::BaselineNotFound`] or [`BudgetError::InvalidState`].
    #[instrument(skip(self), fields(baseline_id = %id))]
    pub async fn delete_baseline(&self, id: BaselineId) -> Result<(), BudgetError> {
        let baseline = self.get_baseline(id).await?;
        BaselineLifecycle::ensure_deletable(&baseline)?;

        self.collaborators.store.delete_draft(id).await?;
        info!("Baseline draft deleted");
        Ok(())
    }

    /// Fetches a baseline.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError::BaselineNotFound`] for an unknown id.
    pub async fn get_baseline(&self, id: BaselineId) -> Result<BudgetBaseline, BudgetError> {
        self.collaborators
            .store
            .get_baseline(id)
            .await?
            .ok_or(BudgetError::BaselineNotFound(id))
    }

    /// Lists a project's baselines by ascending version.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn list_baselines(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<BudgetBaseline>, BudgetError> {
        Ok(self.collaborators.store.list_baselines(project_id).await?)
    }

    /// Records a manual actual cost.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an inverted period or negative amounts.
    #[instrument(skip(self, input), fields(project_id = %input.project_id))]
    pub async fn add_actual(&self, input: CreateActualInput) -> Result<ActualCost, BudgetError> {
        validate_actual(
            input.period_start,
            input.period_end,
            input.actual_total,
            &input.actual_by_category,
        )?;

        let now = Utc::now();
        let actual = ActualCost {
            id: ActualCostId::new(),
            project_id: input.project_id,
            period_start: input.period_start,
            period_end: input.period_end,
            actual_total: input.actual_total,
            actual_by_category: input.actual_by_category,
            source: ActualSource::Manual,
            created_by: input.created_by,
            updated_by: input.created_by,
            created_at: now,
            updated_at: now,
        };

        self.collaborators.store.insert_actual(actual.clone()).await?;
        info!(actual_id = %actual.id, total = %actual.actual_total, "Actual cost recorded");
        Ok(actual)
    }

    /// Updates an actual cost.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError::ActualNotFound`] or a validation error.
    #[instrument(skip(self, input), fields(actual_id = %id))]
    pub async fn update_actual(
        &self,
        id: ActualCostId,
        input: UpdateActualInput,
    ) -> Result<ActualCost, BudgetError> {
        let mut actual = self.get_actual(id).await?;

        if let Some(period_start) = input.period_start {
            actual.period_start = period_start;
        }
        if let Some(period_end) = input.period_end {
            actual.period_end = period_end;
        }
        if let Some(total) = input.actual_total {
            actual.actual_total = total;
        }
        if let Some(categories) = input.actual_by_category {
            actual.actual_by_category = categories;
        }
        validate_actual(
            actual.period_start,
            actual.period_end,
            actual.actual_total,
            &actual.actual_by_category,
        )?;
        actual.updated_by = input.updated_by;
        actual.updated_at = Utc::now();

        self.collaborators.store.update_actual(actual.clone()).await?;
        info!(total = %actual.actual_total, "Actual cost updated");
        Ok(actual)
    }

    /// Deletes an actual cost.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError::ActualNotFound`] for an unknown id.
    #[instrument(skip(self), fields(actual_id = %id))]
    pub async fn delete_actual(&self, id: ActualCostId) -> Result<(), BudgetError> {
        self.collaborators.store.delete_actual(id).await?;
        info!("Actual cost deleted");
        Ok(())
    }

    /// Fetches an actual cost.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError::ActualNotFound`] for an unknown id.
    pub async fn get_actual(&self, id: ActualCostId) -> Result<ActualCost, BudgetError> {
        self.collaborators
            .store
            .get_actual(id)
            .await?
            .ok_or(BudgetError::ActualNotFound(id))
    }

    /// Lists a project's actual costs.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn list_actuals(&self, project_id: ProjectId) -> Result<Vec<ActualCost>, BudgetError> {
        Ok(self.collaborators.store.list_actuals(project_id, None).await?)
    }

    /// Derives an advisory cost for `[period_start, period_end]` and reconciles
    /// it against actuals overlapping that period.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an inverted period or invalid allocation
    /// data, or an error if a collaborator fails.
    #[instrument(skip(self), fields(project_id = %project_id, %period_start, %period_end))]
    pub async fn get_cost_suggestion(
        &self,
        project_id: ProjectId,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<CostSuggestion, BudgetError> {
        let period = Period::new(period_start, period_end)?;

        let suggestion = match self.derive(project_id, period).await? {
            Ok(suggestion) => suggestion,
            Err(reason) => return Ok(CostSuggestion::Unavailable { reason }),
        };

        let existing_actual_total: Decimal = self
            .collaborators
            .store
            .list_actuals(project_id, Some(period))
            .await?
            .iter()
            .map(|actual| actual.actual_total)
            .sum();
        let comparison = self
            .comparison
            .compare(suggestion.derived_total, existing_actual_total);

        Ok(CostSuggestion::Available {
            suggestion,
            comparison,
        })
    }

    /// Records the derived cost for a period as an actual with source `Derived`.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError::DerivationUnavailable`] when the policy is
    /// manual-only, plus the errors of [`BudgetService::get_cost_suggestion`].
    #[instrument(skip(self), fields(project_id = %project_id, %period_start, %period_end))]
    pub async fn record_derived_actual(
        &self,
        project_id: ProjectId,
        period_start: NaiveDate,
        period_end: NaiveDate,
        recorded_by: UserId,
    ) -> Result<ActualCost, BudgetError> {
        let period = Period::new(period_start, period_end)?;
        let suggestion = self
            .derive(project_id, period)
            .await?
            .map_err(|reason| BudgetError::DerivationUnavailable { project_id, reason })?;

        let now = Utc::now();
        let actual = ActualCost {
            id: ActualCostId::new(),
            project_id,
            period_start,
            period_end,
            actual_total: suggestion.derived_total,
            actual_by_category: CategoryAmounts::from([(
                DERIVED_COST_CATEGORY.to_string(),
                suggestion.derived_total,
            )]),
            source: ActualSource::Derived,
            created_by: recorded_by,
            updated_by: recorded_by,
            created_at: now,
            updated_at: now,
        };

        self.collaborators.store.insert_actual(actual.clone()).await?;
        info!(
            actual_id = %actual.id,
            total = %actual.actual_total,
            "Derived cost recorded as actual"
        );
        Ok(actual)
    }

    /// Runs derivation for a period. The inner `Err` carries the reason
    /// derivation is unavailable.
    async fn derive(
        &self,
        project_id: ProjectId,
        period: Period,
    ) -> Result<Result<DerivedCostSuggestion, UnavailableReason>, BudgetError> {
        let policy = self
            .collaborators
            .policies
            .effective_policy(project_id)
            .await?;
        let rules = &policy.cost_derivation_rules;
        if !rules.mode.allows_derivation() {
            return Ok(Err(UnavailableReason::ManualOnly));
        }

        let allocations = self
            .collaborators
            .allocations
            .allocations(project_id, period)
            .await?;
        let outcome =
            self.cache
                .derive_cached(&self.derivation, project_id, period, rules, &allocations)?;

        Ok(match outcome {
            DerivationOutcome::Available(suggestion) => Ok(suggestion),
            DerivationOutcome::Unavailable { reason } => Err(reason),
        })
    }

    async fn progress_snapshot(
        &self,
        project_id: ProjectId,
        spi_enabled: bool,
    ) -> Result<ProgressSnapshot, BudgetError> {
        let progress = &self.collaborators.progress;
        let Some(reported) = progress.percent_complete(project_id).await? else {
            return Ok(ProgressSnapshot::default());
        };

        let percent_complete = reported.clamp(Decimal::ZERO, Decimal::ONE);
        if percent_complete != reported {
            warn!(%reported, clamped = %percent_complete, "Percent complete out of range");
        }

        let planned_value = if spi_enabled {
            progress
                .planned_value(project_id, Utc::now().date_naive())
                .await?
        } else {
            None
        };

        Ok(ProgressSnapshot {
            percent_complete: Some(percent_complete),
            planned_value,
        })
    }
}

fn validate_actual(
    period_start: NaiveDate,
    period_end: NaiveDate,
    total: Decimal,
    categories: &CategoryAmounts,
) -> Result<(), BudgetError> {
    Period::new(period_start, period_end)?;
    if total < Decimal::ZERO {
        return Err(BudgetError::NegativeActualTotal(total));
    }
    if let Some((category, amount)) = categories.iter().find(|(_, amount)| **amount < Decimal::ZERO)
    {
        return Err(BudgetError::NegativeCategoryAmount {
            category: category.clone(),
            amount: *amount,
        });
    }
    Ok(())
}
