//! Money and percentage rounding helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount in the engine is a `rust_decimal::Decimal`; these helpers pin
//! down the rounding rules so every calculator reports identical figures.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for money amounts (cents).
pub const MONEY_DP: u32 = 2;

/// Decimal places kept for performance indices (CPI, SPI).
pub const INDEX_DP: u32 = 4;

/// Decimal places kept for hour totals.
pub const HOURS_DP: u32 = 2;

/// Rounds a money amount to cents, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds an hour quantity, half away from zero.
#[must_use]
pub fn round_hours(hours: Decimal) -> Decimal {
    hours.round_dp_with_strategy(HOURS_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a performance index (CPI/SPI), half away from zero.
#[must_use]
pub fn round_index(index: Decimal) -> Decimal {
    index.round_dp_with_strategy(INDEX_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a percentage to `dp` decimal places, half away from zero.
#[must_use]
pub fn round_percent(percent: Decimal, dp: u32) -> Decimal {
    percent.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Expresses `part` as a percentage of `whole`.
///
/// Returns `None` when `whole` is not strictly positive or the ratio
/// overflows.
#[must_use]
pub fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole > Decimal::ZERO {
        part.checked_div(whole)?.checked_mul(Decimal::ONE_HUNDRED)
    } else {
        None
    }
}

/// Clamps a percentage into `[0, 100]`.
#[must_use]
pub fn clamp_percent(percent: Decimal) -> Decimal {
    percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}
