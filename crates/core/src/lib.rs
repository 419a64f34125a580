//! Core budget engine for Costline.
//!
//! This crate contains pure business logic with no storage or web dependencies.
//! Persistence, allocations, policy, and progress are reached through the
//! async collaborator traits in [`ports`].
//!
//! # Modules
//!
//! - `budget` - Baseline lifecycle, actual costs, variance, and the service
//! - `derivation` - Allocation-based cost suggestions and reconciliation
//! - `evm` - Earned-value formulas and forecast classification
//! - `policy` - Effective budget policy types
//! - `ports` - Collaborator interfaces

pub mod budget;
pub mod derivation;
pub mod evm;
pub mod policy;
pub mod ports;

pub use budget::{BudgetError, BudgetService, Collaborators};
