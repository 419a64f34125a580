//! Policy data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Formula used to compute the estimate at completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EacFormula {
    /// `EAC = AC + (BAC - EV)`: remaining work is performed at budget rate.
    AcPlusRemaining,
    /// `EAC = BAC / CPI`: current cost efficiency persists.
    CpiBased,
}

/// How allocation-based cost derivation is offered for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DerivationMode {
    /// Actuals are only entered by hand; no suggestions are produced.
    ManualOnly,
    /// Suggestions are produced and may be accepted by a user.
    Hybrid,
    /// Suggestions are produced for automatic recording by the caller.
    Auto,
}

impl DerivationMode {
    /// Returns true if cost suggestions may be computed under this mode.
    #[must_use]
    pub const fn allows_derivation(self) -> bool {
        !matches!(self, Self::ManualOnly)
    }
}

/// What to do with an allocation line that has no resolvable rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CostFallbackBehavior {
    /// Exclude the line from totals and count it as skipped.
    Skip,
    /// Cost the line at a zero rate.
    UseZero,
}

/// Forecasting rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForecastingRules {
    /// EAC formula.
    pub eac_formula: EacFormula,
    /// Whether SPI is computed from externally supplied planned value.
    pub spi_enabled: bool,
    /// How often forecasts are expected to be refreshed, in days.
    pub forecast_update_frequency_days: u32,
}

/// Threshold rules, all expressed in percent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThresholdRules {
    /// Cost variance at or above which a project is watched.
    pub cost_variance_warn_percent: Decimal,
    /// Cost variance at or above which further spend should be blocked.
    pub cost_variance_block_percent: Decimal,
    /// Forecast overrun at or above which a project is at risk.
    pub forecast_overrun_warn_percent: Decimal,
    /// Forecast overrun at or above which a project is critical.
    pub forecast_overrun_block_percent: Decimal,
}

/// Cost derivation rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CostDerivationRules {
    /// Derivation mode.
    pub mode: DerivationMode,
    /// Working hours represented by a 100% allocation for a full week.
    pub default_hours_per_week: Decimal,
    /// Behavior when no rate can be resolved.
    pub cost_fallback_behavior: CostFallbackBehavior,
}

/// Fully resolved budget policy for one project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectiveBudgetPolicy {
    /// Forecasting rules.
    pub forecasting_rules: ForecastingRules,
    /// Threshold rules.
    pub threshold_rules: ThresholdRules,
    /// Cost derivation rules.
    pub cost_derivation_rules: CostDerivationRules,
}

impl Default for EffectiveBudgetPolicy {
    fn default() -> Self {
        Self {
            forecasting_rules: ForecastingRules {
                eac_formula: EacFormula::AcPlusRemaining,
                spi_enabled: false,
                forecast_update_frequency_days: 7,
            },
            threshold_rules: ThresholdRules {
                cost_variance_warn_percent: Decimal::TEN,
                cost_variance_block_percent: Decimal::from(25),
                forecast_overrun_warn_percent: Decimal::TEN,
                forecast_overrun_block_percent: Decimal::from(25),
            },
            cost_derivation_rules: CostDerivationRules {
                mode: DerivationMode::Hybrid,
                default_hours_per_week: Decimal::from(40),
                cost_fallback_behavior: CostFallbackBehavior::Skip,
            },
        }
    }
}
