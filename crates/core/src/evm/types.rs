//! Earned-value data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Forecast health of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForecastStatus {
    /// Forecast and spend within thresholds.
    OnTrack,
    /// Spend variance at or above the warning threshold.
    Watch,
    /// Forecast overrun at or above the warning threshold.
    AtRisk,
    /// Forecast overrun at or above the blocking threshold.
    Critical,
}

/// Inputs to an earned-value calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvmInputs {
    /// Budget at completion (baseline total).
    pub bac: Decimal,
    /// Cumulative actual cost.
    pub ac: Decimal,
    /// Fraction of work complete, expected in `[0, 1]`.
    pub percent_complete: Decimal,
    /// Planned value as of today, when SPI is enabled and known.
    pub planned_value: Option<Decimal>,
    /// Baseline-vs-actual variance percent, if defined.
    pub variance_percent: Option<Decimal>,
}

/// Earned-value metrics for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedValueMetrics {
    /// Budget at completion.
    pub bac: Decimal,
    /// Actual cost to date.
    pub ac: Decimal,
    /// Earned value.
    pub ev: Decimal,
    /// Estimate at completion.
    pub eac: Decimal,
    /// Estimate to complete.
    pub etc: Decimal,
    /// Cost performance index; `None` while no cost has been recorded.
    pub cpi: Option<Decimal>,
    /// Schedule performance index; `None` unless enabled and PV is positive.
    pub spi: Option<Decimal>,
    /// Forecast classification.
    pub forecast_status: ForecastStatus,
}
