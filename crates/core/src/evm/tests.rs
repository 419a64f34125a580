//! Property-based tests for earned-value calculations.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calculator::EvmCalculator;
use super::forecast::ForecastClassifier;
use super::types::{EvmInputs, ForecastStatus};
use crate::policy::{EacFormula, ForecastingRules, ThresholdRules};

fn thresholds() -> ThresholdRules {
    ThresholdRules {
        cost_variance_warn_percent: Decimal::TEN,
        cost_variance_block_percent: Decimal::from(20),
        forecast_overrun_warn_percent: Decimal::TEN,
        forecast_overrun_block_percent: Decimal::from(25),
    }
}

fn formula_strategy() -> impl Strategy<Value = EacFormula> {
    prop_oneof![Just(EacFormula::AcPlusRemaining), Just(EacFormula::CpiBased)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// ETC is always EAC minus AC, and EV never exceeds BAC.
    #[test]
    fn prop_etc_is_eac_minus_ac(
        bac in 1i64..100_000_000,
        ac in 0i64..100_000_000,
        pct in 0i64..=100,
        formula in formula_strategy(),
    ) {
        let inputs = EvmInputs {
            bac: Decimal::new(bac, 2),
            ac: Decimal::new(ac, 2),
            percent_complete: Decimal::new(pct, 2),
            planned_value: None,
            variance_percent: None,
        };
        let forecasting = ForecastingRules {
            eac_formula: formula,
            spi_enabled: false,
            forecast_update_frequency_days: 7,
        };

        let metrics = EvmCalculator::calculate(&inputs, &forecasting, &thresholds());

        prop_assert_eq!(metrics.etc, metrics.eac - metrics.ac);
        prop_assert!(metrics.ev <= metrics.bac);
        prop_assert_eq!(metrics.cpi.is_some(), ac > 0);
        prop_assert_eq!(metrics.spi, None);
    }

    /// AC + remaining: EAC equals AC + BAC - EV (to the cent).
    #[test]
    fn prop_ac_plus_remaining_formula(
        bac in 1i64..100_000_000,
        ac in 0i64..100_000_000,
        pct in 0i64..=100,
    ) {
        let bac = Decimal::new(bac, 2);
        let ac = Decimal::new(ac, 2);
        let inputs = EvmInputs {
            bac,
            ac,
            percent_complete: Decimal::new(pct, 2),
            planned_value: None,
            variance_percent: None,
        };
        let forecasting = ForecastingRules {
            eac_formula: EacFormula::AcPlusRemaining,
            spi_enabled: false,
            forecast_update_frequency_days: 7,
        };

        let metrics = EvmCalculator::calculate(&inputs, &forecasting, &thresholds());
        prop_assert_eq!(metrics.eac, ac + bac - metrics.ev);
    }

    /// Classification is monotone in EAC: a larger forecast is never healthier.
    #[test]
    fn prop_classification_monotone_in_eac(
        bac in 1i64..10_000_000,
        eac_a in 0i64..20_000_000,
        eac_b in 0i64..20_000_000,
    ) {
        let bac = Decimal::from(bac);
        let (low, high) = if eac_a <= eac_b { (eac_a, eac_b) } else { (eac_b, eac_a) };

        let low_status = ForecastClassifier::classify(bac, Decimal::from(low), &thresholds(), None);
        let high_status = ForecastClassifier::classify(bac, Decimal::from(high), &thresholds(), None);
        prop_assert!(low_status <= high_status);
        prop_assert_ne!(low_status, ForecastStatus::Watch);
    }
}
