//! Earned-value formulas.

use costline_shared::types::money::{round_index, round_money};
use rust_decimal::Decimal;

use super::forecast::ForecastClassifier;
use super::types::{EarnedValueMetrics, EvmInputs};
use crate::policy::{EacFormula, ForecastingRules, ThresholdRules};

/// Computes EV, EAC, ETC, CPI, and SPI for a project with a baseline.
///
/// Money outputs are rounded to cents and indices to four places; EAC is
/// derived from the unrounded CPI so that `BAC / CPI` stays exact.
pub struct EvmCalculator;

impl EvmCalculator {
    /// Runs the calculation.
    ///
    /// `percent_complete` is clamped into `[0, 1]`. A ratio that overflows
    /// `Decimal` is treated as undefined, so a CPI-based EAC falls back to BAC.
    #[must_use]
    pub fn calculate(
        inputs: &EvmInputs,
        forecasting: &ForecastingRules,
        thresholds: &ThresholdRules,
    ) -> EarnedValueMetrics {
        let EvmInputs { bac, ac, .. } = *inputs;
        let percent_complete = inputs.percent_complete.clamp(Decimal::ZERO, Decimal::ONE);

        // percent_complete <= 1 keeps |ev| <= |bac|
        let ev = bac * percent_complete;
        let cpi = if ac > Decimal::ZERO {
            ev.checked_div(ac)
        } else {
            None
        };

        let eac = match forecasting.eac_formula {
            EacFormula::AcPlusRemaining => bac
                .checked_sub(ev)
                .and_then(|remaining| ac.checked_add(remaining))
                .unwrap_or(bac),
            EacFormula::CpiBased => cpi
                .filter(|cpi| *cpi > Decimal::ZERO)
                .and_then(|cpi| bac.checked_div(cpi))
                .unwrap_or(bac),
        };
        let eac = round_money(eac);
        let etc = eac.checked_sub(ac).unwrap_or(Decimal::ZERO);

        let spi = if forecasting.spi_enabled {
            inputs
                .planned_value
                .filter(|pv| *pv > Decimal::ZERO)
                .and_then(|pv| ev.checked_div(pv))
                .map(round_index)
        } else {
            None
        };

        let forecast_status =
            ForecastClassifier::classify(bac, eac, thresholds, inputs.variance_percent);

        EarnedValueMetrics {
            bac,
            ac,
            ev: round_money(ev),
            eac,
            etc,
            cpi: cpi.map(round_index),
            spi,
            forecast_status,
        }
    }
}
