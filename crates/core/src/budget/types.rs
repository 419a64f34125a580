//! Budget baseline and actual cost types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use costline_shared::types::{ActualCostId, BaselineId, Period, ProjectId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::derivation::{CostComparison, DerivedCostSuggestion, UnavailableReason};
use crate::evm::EarnedValueMetrics;

use super::variance::CategoryVariance;

/// Amounts keyed by cost category, kept sorted for deterministic output.
pub type CategoryAmounts = BTreeMap<String, Decimal>;

/// Baseline status in the approval lifecycle.
///
/// The valid transitions are:
/// - Draft → Approved (approve)
/// - Approved → Superseded (when another baseline of the project is approved)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BaselineStatus {
    /// Being prepared; the only mutable state.
    Draft,
    /// The project's current budget plan.
    Approved,
    /// Replaced by a later approval (immutable).
    Superseded,
}

impl BaselineStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Approved => "approved",
            Self::Superseded => "superseded",
        }
    }

    /// Returns true if the baseline can be modified.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl fmt::Display for BaselineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A versioned budget baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetBaseline {
    /// Baseline ID.
    pub id: BaselineId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Budget at completion.
    pub baseline_total: Decimal,
    /// Planned amounts per cost category.
    #[serde(default)]
    pub baseline_by_category: CategoryAmounts,
    /// Lifecycle status.
    pub status: BaselineStatus,
    /// Version number, starting at 1 per project.
    pub version_number: u32,
    /// Approver, once approved.
    pub approved_by: Option<UserId>,
    /// Approval timestamp.
    pub approved_at: Option<DateTime<Utc>>,
    /// Supersession timestamp.
    pub superseded_at: Option<DateTime<Utc>>,
    /// User whose approval superseded this baseline.
    pub superseded_by: Option<UserId>,
    /// Creator.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Origin of an actual cost record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActualSource {
    /// Entered by hand.
    Manual,
    /// Recorded from an accepted cost suggestion.
    Derived,
}

/// Cost actually incurred over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualCost {
    /// Actual cost ID.
    pub id: ActualCostId,
    /// Owning project.
    pub project_id: ProjectId,
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered (inclusive).
    pub period_end: NaiveDate,
    /// Amount spent.
    pub actual_total: Decimal,
    /// Amount spent per cost category.
    #[serde(default)]
    pub actual_by_category: CategoryAmounts,
    /// Origin of the record.
    pub source: ActualSource,
    /// Creator.
    pub created_by: UserId,
    /// Last editor.
    pub updated_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ActualCost {
    /// Returns true if this record's period shares a day with `period`.
    #[must_use]
    pub fn overlaps(&self, period: &Period) -> bool {
        self.period_start <= period.end() && period.start() <= self.period_end
    }
}

/// Input for creating a baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBaselineInput {
    /// Owning project.
    pub project_id: ProjectId,
    /// Budget at completion; must be positive.
    pub baseline_total: Decimal,
    /// Optional per-category plan.
    #[serde(default)]
    pub baseline_by_category: Option<CategoryAmounts>,
    /// Creator.
    pub created_by: UserId,
}

/// Fields that may change on a draft baseline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBaselineInput {
    /// New budget at completion.
    #[serde(default)]
    pub baseline_total: Option<Decimal>,
    /// New per-category plan.
    #[serde(default)]
    pub baseline_by_category: Option<CategoryAmounts>,
}

/// Input for recording an actual cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateActualInput {
    /// Owning project.
    pub project_id: ProjectId,
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered (inclusive).
    pub period_end: NaiveDate,
    /// Amount spent; must not be negative.
    pub actual_total: Decimal,
    /// Amount spent per category.
    #[serde(default)]
    pub actual_by_category: CategoryAmounts,
    /// Creator.
    pub created_by: UserId,
}

/// Fields that may change on an actual cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateActualInput {
    /// New first day.
    #[serde(default)]
    pub period_start: Option<NaiveDate>,
    /// New last day.
    #[serde(default)]
    pub period_end: Option<NaiveDate>,
    /// New amount.
    #[serde(default)]
    pub actual_total: Option<Decimal>,
    /// New per-category amounts.
    #[serde(default)]
    pub actual_by_category: Option<CategoryAmounts>,
    /// Editor.
    pub updated_by: UserId,
}

/// Budget read model for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSummary {
    /// Project.
    pub project_id: ProjectId,
    /// Current baseline: the approved one, else the latest draft.
    pub baseline: Option<BudgetBaseline>,
    /// All recorded actual costs.
    pub actuals: Vec<ActualCost>,
    /// Sum of all actual totals.
    pub total_actual: Decimal,
    /// `total_actual - baseline_total`; positive means over budget.
    pub variance_total: Decimal,
    /// Variance as a percent of the baseline, one decimal place.
    pub variance_percent: Option<Decimal>,
    /// Per-category variance, sorted by category.
    pub category_variances: Vec<CategoryVariance>,
    /// Earned-value metrics, when a baseline and progress are available.
    pub ev: Option<EarnedValueMetrics>,
}

/// Cost suggestion returned to callers, reconciled against recorded actuals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "availability", rename_all = "snake_case")]
pub enum CostSuggestion {
    /// Derivation is disabled for this project.
    Unavailable {
        /// Reason for unavailability.
        reason: UnavailableReason,
    },
    /// A suggestion was computed.
    Available {
        /// Derived estimate.
        suggestion: DerivedCostSuggestion,
        /// Estimate vs actuals overlapping the same period.
        comparison: CostComparison,
    },
}

impl CostSuggestion {
    /// Returns true if a suggestion was computed.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}
