//! Forecast classification against policy thresholds.

use rust_decimal::Decimal;

use super::types::ForecastStatus;
use crate::policy::ThresholdRules;

/// Maps EVM outputs and policy thresholds to a [`ForecastStatus`].
pub struct ForecastClassifier;

impl ForecastClassifier {
    /// Percentage by which `eac` exceeds `bac`; zero when `bac` is not positive.
    ///
    /// Saturates at `Decimal::MAX` when the ratio overflows.
    #[must_use]
    pub fn overrun_percent(bac: Decimal, eac: Decimal) -> Decimal {
        if bac <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        eac.checked_sub(bac)
            .and_then(|excess| excess.checked_div(bac))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::MAX)
    }

    /// Classifies a forecast. The first matching rule wins:
    ///
    /// 1. overrun ≥ block threshold → `Critical`
    /// 2. overrun ≥ warn threshold → `AtRisk`
    /// 3. cost variance ≥ warn threshold → `Watch`
    /// 4. otherwise → `OnTrack`
    ///
    /// A missing variance percent counts as zero.
    #[must_use]
    pub fn classify(
        bac: Decimal,
        eac: Decimal,
        thresholds: &ThresholdRules,
        variance_percent: Option<Decimal>,
    ) -> ForecastStatus {
        let overrun = Self::overrun_percent(bac, eac);
        let variance = variance_percent.unwrap_or(Decimal::ZERO);

        if overrun >= thresholds.forecast_overrun_block_percent {
            ForecastStatus::Critical
        } else if overrun >= thresholds.forecast_overrun_warn_percent {
            ForecastStatus::AtRisk
        } else if variance >= thresholds.cost_variance_warn_percent {
            ForecastStatus::Watch
        } else {
            ForecastStatus::OnTrack
        }
    }
}
