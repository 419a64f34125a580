//! Reconciliation of derived cost against recorded actuals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{CostComparison, DeltaDirection};

/// Default relative width of the aligned band, in percent of the derived total.
pub const DEFAULT_ALIGNED_TOLERANCE_PERCENT: Decimal = Decimal::ONE;

/// Default absolute minimum width of the aligned band.
pub const DEFAULT_ALIGNED_TOLERANCE_FLOOR: Decimal = Decimal::ONE;

/// Band inside which derived and recorded costs count as aligned.
///
/// `epsilon = max(percent% of |derived_total|, floor)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentTolerance {
    /// Relative width, in percent.
    pub percent: Decimal,
    /// Absolute minimum width.
    pub floor: Decimal,
}

impl AlignmentTolerance {
    /// Returns the band width for a given derived total.
    #[must_use]
    pub fn epsilon(&self, derived_total: Decimal) -> Decimal {
        let relative = (derived_total.abs() / Decimal::ONE_HUNDRED)
            .checked_mul(self.percent)
            .unwrap_or(Decimal::MAX);
        relative.max(self.floor)
    }
}

impl Default for AlignmentTolerance {
    fn default() -> Self {
        Self {
            percent: DEFAULT_ALIGNED_TOLERANCE_PERCENT,
            floor: DEFAULT_ALIGNED_TOLERANCE_FLOOR,
        }
    }
}

/// Compares a derived estimate with recorded actuals.
#[derive(Debug, Clone, Copy, Default)]
pub struct CostComparisonEngine {
    tolerance: AlignmentTolerance,
}

impl CostComparisonEngine {
    /// Creates a comparison engine with the given tolerance.
    #[must_use]
    pub const fn new(tolerance: AlignmentTolerance) -> Self {
        Self { tolerance }
    }

    /// Returns the configured tolerance.
    #[must_use]
    pub const fn tolerance(&self) -> AlignmentTolerance {
        self.tolerance
    }

    /// Reconciles `derived_total` against `existing_actual_total`.
    #[must_use]
    pub fn compare(&self, derived_total: Decimal, existing_actual_total: Decimal) -> CostComparison {
        let delta = derived_total - existing_actual_total;
        let epsilon = self.tolerance.epsilon(derived_total);

        let delta_direction = if delta.abs() <= epsilon {
            DeltaDirection::Aligned
        } else if delta > Decimal::ZERO {
            DeltaDirection::UnderReported
        } else {
            DeltaDirection::OverReported
        };

        CostComparison {
            existing_actual_total,
            derived_total,
            delta,
            delta_direction,
        }
    }
}
