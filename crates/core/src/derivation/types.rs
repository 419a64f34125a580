//! Cost derivation data types.

use chrono::NaiveDate;
use costline_shared::types::{ProjectId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::policy::CostDerivationRules;

/// One weekly allocation line supplied by the allocation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllocationRecord {
    /// Allocated user.
    pub user_id: UserId,
    /// Any day of the allocated week; normalized to its Monday.
    pub week_start: NaiveDate,
    /// Share of the user's week allocated to the project, in percent.
    pub allocation_percent: Decimal,
    /// Share of the week the user is available at all, in percent.
    pub availability_percent: Decimal,
    /// Hourly rate negotiated for this allocation, if any.
    #[serde(default)]
    pub rate_override: Option<Decimal>,
    /// The resource's default hourly rate, if any.
    #[serde(default)]
    pub resource_default_rate: Option<Decimal>,
}

/// Where a line's hourly rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// Allocation-level override.
    AllocationOverride,
    /// Resource default rate.
    ResourceDefault,
    /// No rate found; costed at zero or excluded.
    FallbackZero,
}

/// A resolved hourly rate and its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRate {
    /// Hourly rate.
    pub rate: Decimal,
    /// Origin of the rate.
    pub source: RateSource,
}

/// Costing detail for one allocation line within a week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekAllocationDetail {
    /// Allocated user.
    pub user_id: UserId,
    /// Allocation percent after clamping.
    pub allocation_percent: Decimal,
    /// Availability percent after clamping.
    pub availability_percent: Decimal,
    /// Hours attributed to the project this week.
    pub effective_hours: Decimal,
    /// Hourly rate applied.
    pub cost_per_hour: Decimal,
    /// `effective_hours * cost_per_hour`, zero when excluded.
    pub line_cost: Decimal,
    /// Origin of the rate.
    pub rate_source: RateSource,
    /// True when the line had no rate and was left out of the totals.
    pub excluded: bool,
}

/// Aggregated cost for one calendar week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyCostSlice {
    /// Monday of the week.
    pub week_start: NaiveDate,
    /// Sunday of the week.
    pub week_end: NaiveDate,
    /// Every allocation line of the week, excluded ones included.
    pub allocations: Vec<WeekAllocationDetail>,
    /// Hours of the non-excluded lines.
    pub total_hours: Decimal,
    /// Cost of the non-excluded lines.
    pub total_cost: Decimal,
}

/// Cost estimate derived from resource allocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedCostSuggestion {
    /// Project the estimate belongs to.
    pub project_id: ProjectId,
    /// First day of the requested period.
    pub period_start: NaiveDate,
    /// Last day of the requested period.
    pub period_end: NaiveDate,
    /// Sum of all weekly slice costs.
    pub derived_total: Decimal,
    /// Weekly slices, ascending by week start.
    pub weekly_breakdown: Vec<WeeklyCostSlice>,
    /// Number of lines whose cost contributed to the total.
    pub allocations_used: u32,
    /// Number of lines excluded for lack of a rate.
    pub skipped_no_rate: u32,
    /// Derivation rules the estimate was computed under.
    pub policy: CostDerivationRules,
}

/// Why no suggestion was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnavailableReason {
    /// The project's policy only accepts manually entered actuals.
    #[serde(rename = "manual-only")]
    ManualOnly,
}

/// Result of a derivation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "availability", rename_all = "snake_case")]
pub enum DerivationOutcome {
    /// Derivation is disabled for this project.
    Unavailable {
        /// Reason for unavailability.
        reason: UnavailableReason,
    },
    /// A suggestion was computed.
    Available(DerivedCostSuggestion),
}

impl DerivationOutcome {
    /// Returns true if a suggestion was computed.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Returns the suggestion, if any.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&DerivedCostSuggestion> {
        match self {
            Self::Available(suggestion) => Some(suggestion),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Direction of the gap between derived and recorded cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeltaDirection {
    /// Recorded actuals are within tolerance of the derived cost.
    Aligned,
    /// Recorded actuals understate the derived cost; entries are likely missing.
    UnderReported,
    /// Recorded actuals exceed the derived cost.
    OverReported,
}

/// Derived cost reconciled against recorded actuals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostComparison {
    /// Sum of recorded actuals overlapping the period.
    pub existing_actual_total: Decimal,
    /// Derived cost for the period.
    pub derived_total: Decimal,
    /// `derived_total - existing_actual_total`.
    pub delta: Decimal,
    /// Classification of `delta`.
    pub delta_direction: DeltaDirection,
}
