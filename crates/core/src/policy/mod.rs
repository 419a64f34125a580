//! Effective budget policy supplied by the policy collaborator.
//!
//! The engine never resolves the org → workspace → project hierarchy itself;
//! it receives an already-flattened [`EffectiveBudgetPolicy`] and passes it
//! explicitly into every calculation.

pub mod types;

pub use types::{
    CostDerivationRules, CostFallbackBehavior, DerivationMode, EacFormula, EffectiveBudgetPolicy,
    ForecastingRules, ThresholdRules,
};
