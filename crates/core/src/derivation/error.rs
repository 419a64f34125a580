//! Cost derivation error types.

use chrono::NaiveDate;
use costline_shared::types::{InvalidPeriod, UserId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Cost derivation errors.
#[derive(Debug, Error)]
pub enum DerivationError {
    /// Requested period is inverted.
    #[error(transparent)]
    InvalidPeriod(#[from] InvalidPeriod),

    /// An allocation or availability percentage is negative.
    #[error("Negative {field} {value} for user {user_id} in week of {week_start}")]
    NegativePercent {
        /// Which percentage was negative.
        field: &'static str,
        /// The offending value.
        value: Decimal,
        /// Allocated user.
        user_id: UserId,
        /// Week of the allocation.
        week_start: NaiveDate,
    },

    /// A supplied hourly rate is negative.
    #[error("Negative hourly rate {value} for user {user_id} in week of {week_start}")]
    NegativeRate {
        /// The offending rate.
        value: Decimal,
        /// Allocated user.
        user_id: UserId,
        /// Week of the allocation.
        week_start: NaiveDate,
    },

    /// Policy hours per week is negative.
    #[error("Default hours per week cannot be negative: {0}")]
    NegativeHoursPerWeek(Decimal),

    /// A derived amount does not fit in a `Decimal`.
    #[error("Arithmetic overflow computing {0}")]
    ArithmeticOverflow(&'static str),
}

impl DerivationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPeriod(_) => "INVALID_PERIOD",
            Self::NegativePercent { .. } => "NEGATIVE_PERCENT",
            Self::NegativeRate { .. } => "NEGATIVE_RATE",
            Self::NegativeHoursPerWeek(_) => "NEGATIVE_HOURS_PER_WEEK",
            Self::ArithmeticOverflow(_) => "ARITHMETIC_OVERFLOW",
        }
    }
}
