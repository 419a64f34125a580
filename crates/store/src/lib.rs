//! In-memory collaborators for the Costline engine.
//!
//! [`InMemoryBudgetStore`] is a reference [`BudgetStore`] honoring the
//! approval contract; the static providers serve fixed allocation, policy,
//! and progress data.
//!
//! [`BudgetStore`]: costline_core::ports::BudgetStore

pub mod memory;
pub mod providers;

pub use memory::InMemoryBudgetStore;
pub use providers::{
    ProgressEntry, StaticAllocationProvider, StaticPolicyResolver, StaticProgressProvider,
};
