//! Allocation-based cost derivation and reconciliation.
//!
//! # Modules
//!
//! - `rate` - Ordered hourly rate resolution chain
//! - `engine` - Weekly cost aggregation from allocations
//! - `comparison` - Derived cost vs recorded actuals
//! - `cache` - Deterministic result caching

pub mod cache;
pub mod comparison;
pub mod engine;
pub mod error;
pub mod rate;
pub mod types;


pub use cache::{SuggestionCache, SuggestionKey};
pub use comparison::{AlignmentTolerance, CostComparisonEngine};
pub use engine::CostDerivationEngine;
pub use error::DerivationError;
pub use rate::{RateLookup, RateResolution, RateResolver};
pub use types::{
    AllocationRecord, CostComparison, DeltaDirection, DerivationOutcome, DerivedCostSuggestion,
    RateSource, ResolvedRate, UnavailableReason, WeekAllocationDetail, WeeklyCostSlice,
};
