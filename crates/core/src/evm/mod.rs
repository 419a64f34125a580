//! Earned-value management and forecast classification.

pub mod calculator;
pub mod forecast;
pub mod types;

#[cfg(test)]
mod tests;

pub use calculator::EvmCalculator;
pub use forecast::ForecastClassifier;
pub use types::{EarnedValueMetrics, EvmInputs, ForecastStatus};
