//! Hourly rate resolution.
//!
//! Rates are resolved through an ordered chain of [`RateLookup`] steps. The
//! first step that yields a rate wins; when none does, the policy's
//! [`CostFallbackBehavior`] decides between a zero rate and exclusion.

use rust_decimal::Decimal;

use super::types::{AllocationRecord, RateSource, ResolvedRate};
use crate::policy::CostFallbackBehavior;

/// One link in the rate resolution chain.
pub trait RateLookup: Send + Sync {
    /// Returns a rate for the line, or `None` to defer to the next step.
    fn lookup(&self, line: &AllocationRecord) -> Option<ResolvedRate>;
}

/// Uses the allocation-level rate override.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationOverrideLookup;

impl RateLookup for AllocationOverrideLookup {
    fn lookup(&self, line: &AllocationRecord) -> Option<ResolvedRate> {
        line.rate_override.map(|rate| ResolvedRate {
            rate,
            source: RateSource::AllocationOverride,
        })
    }
}

/// Uses the resource's default rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceDefaultLookup;

impl RateLookup for ResourceDefaultLookup {
    fn lookup(&self, line: &AllocationRecord) -> Option<ResolvedRate> {
        line.resource_default_rate.map(|rate| ResolvedRate {
            rate,
            source: RateSource::ResourceDefault,
        })
    }
}

/// Outcome of resolving a line's rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateResolution {
    /// A rate applies (possibly the zero fallback).
    Resolved(ResolvedRate),
    /// No rate applies and the line must be left out of totals.
    Excluded,
}

/// Ordered rate resolution chain.
pub struct RateResolver {
    chain: Vec<Box<dyn RateLookup>>,
}

impl RateResolver {
    /// Creates the standard chain: allocation override, then resource default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chain: vec![
                Box::new(AllocationOverrideLookup),
                Box::new(ResourceDefaultLookup),
            ],
        }
    }

    /// Appends a lookup step, consulted after every existing step.
    #[must_use]
    pub fn with_lookup(mut self, lookup: impl RateLookup + 'static) -> Self {
        self.chain.push(Box::new(lookup));
        self
    }

    /// Resolves the rate for one allocation line.
    #[must_use]
    pub fn resolve(
        &self,
        line: &AllocationRecord,
        fallback: CostFallbackBehavior,
    ) -> RateResolution {
        if let Some(resolved) = self.chain.iter().find_map(|step| step.lookup(line)) {
            return RateResolution::Resolved(resolved);
        }

        match fallback {
            CostFallbackBehavior::UseZero => RateResolution::Resolved(ResolvedRate {
                rate: Decimal::ZERO,
                source: RateSource::FallbackZero,
            }),
            CostFallbackBehavior::Skip => RateResolution::Excluded,
        }
    }
}

impl Default for RateResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RateResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateResolver")
            .field("steps", &self.chain.len())
            .finish()
    }
}
