//! Scenario files: a project's history replayed through the engine.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use costline_core::budget::{
    BudgetError, BudgetService, BudgetSummary, CategoryAmounts, Collaborators, CostSuggestion,
    CreateActualInput, CreateBaselineInput,
};
use costline_core::derivation::AllocationRecord;
use costline_core::policy::EffectiveBudgetPolicy;
use costline_shared::EngineConfig;
use costline_shared::types::{ProjectId, UserId};
use costline_store::{
    InMemoryBudgetStore, ProgressEntry, StaticAllocationProvider, StaticPolicyResolver,
    StaticProgressProvider,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A project's baselines, actuals, allocations, and progress.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Project.
    pub project_id: ProjectId,
    /// Effective policy for the project.
    #[serde(default)]
    pub policy: EffectiveBudgetPolicy,
    /// Baselines in creation order.
    #[serde(default)]
    pub baselines: Vec<BaselineStep>,
    /// Recorded actual costs.
    #[serde(default)]
    pub actuals: Vec<ActualStep>,
    /// Weekly allocation lines.
    #[serde(default)]
    pub allocations: Vec<AllocationRecord>,
    /// Schedule progress.
    #[serde(default)]
    pub progress: Option<ProgressStep>,
    /// Period to derive a cost suggestion for.
    #[serde(default)]
    pub suggestion_period: Option<SuggestionPeriod>,
}

/// One baseline to create, optionally approved right away.
#[derive(Debug, Clone, Deserialize)]
pub struct BaselineStep {
    /// Budget at completion.
    pub baseline_total: Decimal,
    /// Per-category plan.
    #[serde(default)]
    pub baseline_by_category: Option<CategoryAmounts>,
    /// Approve after creation.
    #[serde(default)]
    pub approve: bool,
}

/// One actual cost record.
#[derive(Debug, Clone, Deserialize)]
pub struct ActualStep {
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered.
    pub period_end: NaiveDate,
    /// Amount spent.
    pub actual_total: Decimal,
    /// Amount spent per category.
    #[serde(default)]
    pub actual_by_category: CategoryAmounts,
}

/// Progress reported for the project.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressStep {
    /// Fraction of work complete.
    pub percent_complete: Option<Decimal>,
    /// Cumulative planned value by date.
    #[serde(default)]
    pub planned_value: BTreeMap<NaiveDate, Decimal>,
}

/// Inclusive date range for the cost suggestion.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SuggestionPeriod {
    /// First day.
    pub start: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
}

/// The report printed by the binary.
#[derive(Debug, Serialize)]
pub struct Report {
    /// Budget summary after replay.
    pub summary: BudgetSummary,
    /// Cost suggestion for the requested period.
    pub cost_suggestion: Option<CostSuggestion>,
}

/// Replays `scenario` against fresh in-memory collaborators.
///
/// # Errors
///
/// Returns the first engine error, e.g. a rejected baseline or actual.
pub async fn replay(scenario: Scenario, config: &EngineConfig) -> Result<Report, BudgetError> {
    let project_id = scenario.project_id;
    let operator = UserId::new();

    let allocations = Arc::new(StaticAllocationProvider::new());
    allocations
        .set_allocations(project_id, scenario.allocations)
        .await;

    let progress = Arc::new(StaticProgressProvider::new());
    if let Some(step) = scenario.progress {
        progress
            .set_progress(
                project_id,
                ProgressEntry {
                    percent_complete: step.percent_complete,
                    planned_value_curve: step.planned_value,
                },
            )
            .await;
    }

    let service = BudgetService::from_config(
        Collaborators {
            store: Arc::new(InMemoryBudgetStore::new()),
            allocations,
            policies: Arc::new(StaticPolicyResolver::new(scenario.policy)),
            progress,
        },
        config,
    );

    for step in scenario.baselines {
        let baseline = service
            .create_baseline(CreateBaselineInput {
                project_id,
                baseline_total: step.baseline_total,
                baseline_by_category: step.baseline_by_category,
                created_by: operator,
            })
            .await?;
        if step.approve {
            service.approve_baseline(baseline.id, operator).await?;
        }
    }

    for step in scenario.actuals {
        service
            .add_actual(CreateActualInput {
                project_id,
                period_start: step.period_start,
                period_end: step.period_end,
                actual_total: step.actual_total,
                actual_by_category: step.actual_by_category,
                created_by: operator,
            })
            .await?;
    }

    let summary = service.get_summary(project_id).await?;
    let cost_suggestion = match scenario.suggestion_period {
        Some(period) => Some(
            service
                .get_cost_suggestion(project_id, period.start, period.end)
                .await?,
        ),
        None => None,
    };

    info!(
        %project_id,
        total_actual = %summary.total_actual,
        "Scenario replayed"
    );
    Ok(Report {
        summary,
        cost_suggestion,
    })
}
