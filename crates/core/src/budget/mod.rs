//! Budget baselines, actual costs, and the service tying them together.
//!
//! # Modules
//!
//! - `lifecycle` - Draft → Approved → Superseded state machine
//! - `variance` - Baseline vs actual variance
//! - `summary` - Budget summary read model
//! - `service` - Async operations over the collaborator ports

pub mod error;
pub mod lifecycle;
pub mod service;
pub mod summary;
pub mod types;
pub mod variance;

#[cfg(test)]
mod lifecycle_props;

pub use error::BudgetError;
pub use lifecycle::{ApprovalCommit, BaselineLifecycle};
pub use service::{BudgetService, Collaborators, DERIVED_COST_CATEGORY};
pub use summary::{BudgetSummaryAssembler, ProgressSnapshot};
pub use types::{
    ActualCost, ActualSource, BaselineStatus, BudgetBaseline, BudgetSummary, CategoryAmounts,
    CostSuggestion, CreateActualInput, CreateBaselineInput, UpdateActualInput,
    UpdateBaselineInput,
};
pub use variance::{BaselineVariance, CategoryVariance, VarianceStatus, category_variances};
