//! Static allocation, policy, and progress collaborators.
//!
//! Data is seeded up front (from a scenario file or a test) and served as-is.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use costline_core::derivation::AllocationRecord;
use costline_core::policy::EffectiveBudgetPolicy;
use costline_core::ports::{AllocationProvider, PolicyResolver, ProgressProvider, ProviderError};
use costline_shared::types::period::{week_end_of, week_start_of};
use costline_shared::types::{Period, ProjectId};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

/// Serves seeded weekly allocations.
#[derive(Debug, Default)]
pub struct StaticAllocationProvider {
    allocations: RwLock<HashMap<ProjectId, Vec<AllocationRecord>>>,
}

impl StaticAllocationProvider {
    /// Creates a provider with no allocations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces a project's allocation lines.
    pub async fn set_allocations(&self, project_id: ProjectId, records: Vec<AllocationRecord>) {
        self.allocations.write().await.insert(project_id, records);
    }
}

#[async_trait]
impl AllocationProvider for StaticAllocationProvider {
    async fn allocations(
        &self,
        project_id: ProjectId,
        period: Period,
    ) -> Result<Vec<AllocationRecord>, ProviderError> {
        let allocations = self.allocations.read().await;
        Ok(allocations
            .get(&project_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| {
                        let week_start = week_start_of(record.week_start);
                        week_start <= period.end() && week_end_of(week_start) >= period.start()
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Serves a default policy with optional per-project overrides.
#[derive(Debug, Default)]
pub struct StaticPolicyResolver {
    default_policy: EffectiveBudgetPolicy,
    overrides: RwLock<HashMap<ProjectId, EffectiveBudgetPolicy>>,
}

impl StaticPolicyResolver {
    /// Creates a resolver returning `default_policy` for every project.
    #[must_use]
    pub fn new(default_policy: EffectiveBudgetPolicy) -> Self {
        Self {
            default_policy,
            overrides: RwLock::default(),
        }
    }

    /// Sets the effective policy for one project.
    pub async fn set_policy(&self, project_id: ProjectId, policy: EffectiveBudgetPolicy) {
        self.overrides.write().await.insert(project_id, policy);
    }
}

#[async_trait]
impl PolicyResolver for StaticPolicyResolver {
    async fn effective_policy(
        &self,
        project_id: ProjectId,
    ) -> Result<EffectiveBudgetPolicy, ProviderError> {
        Ok(self
            .overrides
            .read()
            .await
            .get(&project_id)
            .cloned()
            .unwrap_or_else(|| self.default_policy.clone()))
    }
}

/// Progress data for one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressEntry {
    /// Fraction complete, as reported (not yet clamped).
    pub percent_complete: Option<Decimal>,
    /// Cumulative planned value by date.
    pub planned_value_curve: BTreeMap<NaiveDate, Decimal>,
}

/// Serves seeded progress data.
#[derive(Debug, Default)]
pub struct StaticProgressProvider {
    entries: RwLock<HashMap<ProjectId, ProgressEntry>>,
}

impl StaticProgressProvider {
    /// Creates a provider with no progress data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces a project's progress data.
    pub async fn set_progress(&self, project_id: ProjectId, entry: ProgressEntry) {
        self.entries.write().await.insert(project_id, entry);
    }
}

#[async_trait]
impl ProgressProvider for StaticProgressProvider {
    async fn percent_complete(
        &self,
        project_id: ProjectId,
    ) -> Result<Option<Decimal>, ProviderError> {
        Ok(self
            .entries
            .read()
            .await
            .get(&project_id)
            .and_then(|entry| entry.percent_complete))
    }

    /// Latest planned value on or before `as_of`.
    async fn planned_value(
        &self,
        project_id: ProjectId,
        as_of: NaiveDate,
    ) -> Result<Option<Decimal>, ProviderError> {
        Ok(self.entries.read().await.get(&project_id).and_then(|entry| {
            entry
                .planned_value_curve
                .range(..=as_of)
                .next_back()
                .map(|(_, value)| *value)
        }))
    }
}
