//! Shared fixtures for store integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use costline_core::budget::{BudgetService, Collaborators};
use costline_core::policy::EffectiveBudgetPolicy;
use costline_store::{
    InMemoryBudgetStore, StaticAllocationProvider, StaticPolicyResolver, StaticProgressProvider,
};

/// A service wired to in-memory collaborators, with handles for seeding.
pub struct Harness {
    pub service: BudgetService,
    pub store: Arc<InMemoryBudgetStore>,
    pub allocations: Arc<StaticAllocationProvider>,
    pub policies: Arc<StaticPolicyResolver>,
    pub progress: Arc<StaticProgressProvider>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_policy(EffectiveBudgetPolicy::default())
    }

    pub fn with_policy(policy: EffectiveBudgetPolicy) -> Self {
        let store = Arc::new(InMemoryBudgetStore::new());
        let allocations = Arc::new(StaticAllocationProvider::new());
        let policies = Arc::new(StaticPolicyResolver::new(policy));
        let progress = Arc::new(StaticProgressProvider::new());

        let service = BudgetService::new(Collaborators {
            store: store.clone(),
            allocations: allocations.clone(),
            policies: policies.clone(),
            progress: progress.clone(),
        });

        Self {
            service,
            store,
            allocations,
            policies,
            progress,
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
