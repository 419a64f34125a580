//! Derived cost suggestion caching using Moka.
//!
//! Derivation is deterministic, so results are keyed by everything they
//! depend on: project, period, a hash of the derivation rules, and a hash of
//! the allocation inputs. Allocation or policy changes therefore miss the
//! cache without explicit invalidation.

use moka::sync::Cache;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

use costline_shared::types::{Period, ProjectId};

use super::engine::CostDerivationEngine;
use super::error::DerivationError;
use super::types::{AllocationRecord, DerivationOutcome};
use crate::policy::CostDerivationRules;

/// Default cache capacity (number of entries).
const DEFAULT_CACHE_CAPACITY: u64 = 256;

/// Default time-to-live for cache entries (5 minutes).
const DEFAULT_TTL_SECS: u64 = 300;

/// Cache key for one derivation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SuggestionKey {
    /// Project.
    pub project_id: ProjectId,
    /// Requested period.
    pub period: Period,
    /// SHA-256 of the derivation rules.
    pub policy_hash: String,
    /// SHA-256 of the allocation records.
    pub inputs_hash: String,
}

impl SuggestionKey {
    /// Builds the key for a derivation request.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        period: Period,
        rules: &CostDerivationRules,
        allocations: &[AllocationRecord],
    ) -> Self {
        Self {
            project_id,
            period,
            policy_hash: hash_json(rules),
            inputs_hash: hash_json(allocations),
        }
    }
}

fn hash_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    let mut hasher = Sha256::new();
    // Serializing plain data structs to a Vec cannot fail
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    hasher.update(&bytes);
    format!("{:x}", hasher.finalize())
}

/// Cache for derived cost suggestions.
///
/// Thread-safe and suitable for concurrent access. Only successful outcomes
/// are cached.
#[derive(Clone)]
pub struct SuggestionCache {
    cache: Cache<SuggestionKey, Arc<DerivationOutcome>>,
}

impl SuggestionCache {
    /// Creates a new cache with default settings.
    ///
    /// Default: 256 entries max, 5 minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a new cache with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `max_capacity` - Maximum number of entries to cache
    /// * `ttl_secs` - Time-to-live in seconds for each entry
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Derives a suggestion, returning the cached outcome if available.
    ///
    /// # Errors
    ///
    /// Propagates derivation errors; failures are never cached.
    pub fn derive_cached(
        &self,
        engine: &CostDerivationEngine,
        project_id: ProjectId,
        period: Period,
        rules: &CostDerivationRules,
        allocations: &[AllocationRecord],
    ) -> Result<DerivationOutcome, DerivationError> {
        let key = SuggestionKey::new(project_id, period, rules, allocations);

        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(%project_id, "cost suggestion cache hit");
            return Ok((*cached).clone());
        }

        let outcome = engine.derive(project_id, period, rules, allocations)?;
        self.cache.insert(key, Arc::new(outcome.clone()));

        Ok(outcome)
    }

    /// Returns true if an outcome is cached for the key.
    #[must_use]
    pub fn contains(&self, key: &SuggestionKey) -> bool {
        self.cache.contains_key(key)
    }

    /// Invalidates all cached entries.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Returns the number of entries currently in the cache.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs cache maintenance tasks.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl Default for SuggestionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SuggestionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionCache")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{CostFallbackBehavior, DerivationMode};
    use chrono::NaiveDate;
    use costline_shared::types::UserId;
    use rust_decimal_macros::dec;

    fn period() -> Period {
        Period::new(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        )
        .unwrap()
    }

    fn rules() -> CostDerivationRules {
        CostDerivationRules {
            mode: DerivationMode::Hybrid,
            default_hours_per_week: dec!(40),
            cost_fallback_behavior: CostFallbackBehavior::Skip,
        }
    }

    fn allocations() -> Vec<AllocationRecord> {
        vec![AllocationRecord {
            user_id: UserId::new(),
            week_start: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            allocation_percent: dec!(50),
            availability_percent: dec!(100),
            rate_override: None,
            resource_default_rate: Some(dec!(100)),
        }]
    }

    #[test]
    fn test_cache_miss_then_hit() {
        let cache = SuggestionCache::new();
        let engine = CostDerivationEngine::new();
        let project_id = ProjectId::new();
        let data = allocations();
        let key = SuggestionKey::new(project_id, period(), &rules(), &data);

        assert!(!cache.contains(&key));
        let first = cache
            .derive_cached(&engine, project_id, period(), &rules(), &data)
            .unwrap();
        assert!(cache.contains(&key));

        let second = cache
            .derive_cached(&engine, project_id, period(), &rules(), &data)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_changed_inputs_change_key() {
        let project_id = ProjectId::new();
        let data = allocations();
        let base = SuggestionKey::new(project_id, period(), &rules(), &data);

        let mut changed_data = data.clone();
        changed_data[0].allocation_percent = dec!(60);
        let by_inputs = SuggestionKey::new(project_id, period(), &rules(), &changed_data);
        assert_eq!(base.policy_hash, by_inputs.policy_hash);
        assert_ne!(base.inputs_hash, by_inputs.inputs_hash);

        let mut changed_rules = rules();
        changed_rules.cost_fallback_behavior = CostFallbackBehavior::UseZero;
        let by_policy = SuggestionKey::new(project_id, period(), &changed_rules, &data);
        assert_ne!(base.policy_hash, by_policy.policy_hash);
        assert_eq!(base.inputs_hash, by_policy.inputs_hash);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = SuggestionCache::new();
        let engine = CostDerivationEngine::new();
        let project_id = ProjectId::new();
        let mut data = allocations();
        data[0].availability_percent = dec!(-1);
        let key = SuggestionKey::new(project_id, period(), &rules(), &data);

        assert!(
            cache
                .derive_cached(&engine, project_id, period(), &rules(), &data)
                .is_err()
        );
        assert!(!cache.contains(&key));
    }

    #[test]
    fn test_invalidate_all() {
        let cache = SuggestionCache::with_config(10, 60);
        let engine = CostDerivationEngine::new();
        let project_id = ProjectId::new();
        let data = allocations();
        let key = SuggestionKey::new(project_id, period(), &rules(), &data);

        let _ = cache.derive_cached(&engine, project_id, period(), &rules(), &data);
        cache.run_pending_tasks();
        assert!(cache.entry_count() >= 1);

        cache.invalidate_all();
        cache.run_pending_tasks();
        assert!(!cache.contains(&key));
    }
}
