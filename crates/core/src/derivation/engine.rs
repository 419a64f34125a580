//! Allocation-based cost derivation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use costline_shared::types::money::{clamp_percent, round_hours, round_money};
use costline_shared::types::period::{week_end_of, week_start_of};
use costline_shared::types::{Period, ProjectId};
use rust_decimal::Decimal;

use super::error::DerivationError;
use super::rate::{RateResolution, RateResolver};
use super::types::{
    AllocationRecord, DerivationOutcome, DerivedCostSuggestion, RateSource, UnavailableReason,
    WeekAllocationDetail, WeeklyCostSlice,
};
use crate::policy::CostDerivationRules;

/// Turns weekly resource allocations into a time-phased cost estimate.
///
/// The engine is stateless apart from its rate resolution chain; identical
/// inputs always produce identical output.
#[derive(Debug, Default)]
pub struct CostDerivationEngine {
    resolver: RateResolver,
}

impl CostDerivationEngine {
    /// Creates an engine with the standard rate resolution chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with a custom rate resolution chain.
    #[must_use]
    pub const fn with_resolver(resolver: RateResolver) -> Self {
        Self { resolver }
    }

    /// Derives the cost of `allocations` over `period`.
    ///
    /// Allocations whose calendar week does not overlap the period are
    /// ignored. Percentages above 100 are clamped; negative percentages and
    /// negative rates are rejected.
    ///
    /// # Errors
    ///
    /// Returns a [`DerivationError`] for negative percentages, rates, or
    /// hours per week, and when a cost or hour total overflows `Decimal`.
    pub fn derive(
        &self,
        project_id: ProjectId,
        period: Period,
        rules: &CostDerivationRules,
        allocations: &[AllocationRecord],
    ) -> Result<DerivationOutcome, DerivationError> {
        if !rules.mode.allows_derivation() {
            return Ok(DerivationOutcome::Unavailable {
                reason: UnavailableReason::ManualOnly,
            });
        }
        if rules.default_hours_per_week < Decimal::ZERO {
            return Err(DerivationError::NegativeHoursPerWeek(
                rules.default_hours_per_week,
            ));
        }

        let mut weeks: BTreeMap<NaiveDate, WeeklyCostSlice> = BTreeMap::new();
        let mut allocations_used = 0u32;
        let mut skipped_no_rate = 0u32;

        for line in allocations {
            validate_line(line)?;

            let week_start = week_start_of(line.week_start);
            let week_end = week_end_of(week_start);
            if week_start > period.end() || week_end < period.start() {
                continue;
            }

            let allocation_percent = clamp_percent(line.allocation_percent);
            let availability_percent = clamp_percent(line.availability_percent);
            let effective_hours = effective_hours(
                rules.default_hours_per_week,
                allocation_percent,
                availability_percent,
            )?;

            let slice = weeks.entry(week_start).or_insert_with(|| WeeklyCostSlice {
                week_start,
                week_end,
                allocations: Vec::new(),
                total_hours: Decimal::ZERO,
                total_cost: Decimal::ZERO,
            });

            let detail = match self.resolver.resolve(line, rules.cost_fallback_behavior) {
                RateResolution::Resolved(resolved) => {
                    let line_cost = effective_hours
                        .checked_mul(resolved.rate)
                        .map(round_money)
                        .ok_or(DerivationError::ArithmeticOverflow("line cost"))?;
                    slice.total_hours =
                        checked_sum(slice.total_hours, effective_hours, "week hours")?;
                    slice.total_cost = checked_sum(slice.total_cost, line_cost, "week cost")?;
                    allocations_used += 1;
                    WeekAllocationDetail {
                        user_id: line.user_id,
                        allocation_percent,
                        availability_percent,
                        effective_hours,
                        cost_per_hour: resolved.rate,
                        line_cost,
                        rate_source: resolved.source,
                        excluded: false,
                    }
                }
                RateResolution::Excluded => {
                    skipped_no_rate += 1;
                    WeekAllocationDetail {
                        user_id: line.user_id,
                        allocation_percent,
                        availability_percent,
                        effective_hours,
                        cost_per_hour: Decimal::ZERO,
                        line_cost: Decimal::ZERO,
                        rate_source: RateSource::FallbackZero,
                        excluded: true,
                    }
                }
            };
            slice.allocations.push(detail);
        }

        let weekly_breakdown: Vec<WeeklyCostSlice> = weeks.into_values().collect();
        let derived_total = weekly_breakdown
            .iter()
            .try_fold(Decimal::ZERO, |total, slice| {
                checked_sum(total, slice.total_cost, "derived total")
            })?;

        Ok(DerivationOutcome::Available(DerivedCostSuggestion {
            project_id,
            period_start: period.start(),
            period_end: period.end(),
            derived_total,
            weekly_breakdown,
            allocations_used,
            skipped_no_rate,
            policy: rules.clone(),
        }))
    }
}

fn effective_hours(
    hours_per_week: Decimal,
    allocation_percent: Decimal,
    availability_percent: Decimal,
) -> Result<Decimal, DerivationError> {
    hours_per_week
        .checked_mul(allocation_percent / Decimal::ONE_HUNDRED)
        .and_then(|hours| hours.checked_mul(availability_percent / Decimal::ONE_HUNDRED))
        .map(round_hours)
        .ok_or(DerivationError::ArithmeticOverflow("effective hours"))
}

fn checked_sum(
    total: Decimal,
    amount: Decimal,
    what: &'static str,
) -> Result<Decimal, DerivationError> {
    total
        .checked_add(amount)
        .ok_or(DerivationError::ArithmeticOverflow(what))
}

fn validate_line(line: &AllocationRecord) -> Result<(), DerivationError> {
    for (field, value) in [
        ("allocation percent", line.allocation_percent),
        ("availability percent", line.availability_percent),
    ] {
        if value < Decimal::ZERO {
            return Err(DerivationError::NegativePercent {
                field,
                value,
                user_id: line.user_id,
                week_start: line.week_start,
            });
        }
    }

    for rate in [line.rate_override, line.resource_default_rate]
        .into_iter()
        .flatten()
    {
        if rate < Decimal::ZERO {
            return Err(DerivationError::NegativeRate {
                value: rate,
                user_id: line.user_id,
                week_start: line.week_start,
            });
        }
    }

    Ok(())
}
