//! In-memory baseline and actual cost storage.

use std::collections::HashMap;

use async_trait::async_trait;
use costline_core::budget::{
    ActualCost, ApprovalCommit, BaselineLifecycle, BaselineStatus, BudgetBaseline,
};
use costline_core::ports::{BudgetStore, StoreError};
use costline_shared::types::{ActualCostId, BaselineId, Period, ProjectId};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct State {
    baselines: HashMap<BaselineId, BudgetBaseline>,
    actuals: HashMap<ActualCostId, ActualCost>,
}

impl State {
    fn project_baselines(&self, project_id: ProjectId) -> impl Iterator<Item = &BudgetBaseline> {
        self.baselines
            .values()
            .filter(move |baseline| baseline.project_id == project_id)
    }

    fn find_with_status(
        &self,
        project_id: ProjectId,
        status: BaselineStatus,
    ) -> Option<&BudgetBaseline> {
        self.project_baselines(project_id)
            .find(|baseline| baseline.status == status)
    }

    fn stored_draft(&self, id: BaselineId) -> Result<&BudgetBaseline, StoreError> {
        let stored = self
            .baselines
            .get(&id)
            .ok_or(StoreError::BaselineNotFound(id))?;
        if stored.status == BaselineStatus::Draft {
            Ok(stored)
        } else {
            Err(StoreError::NotDraft(id))
        }
    }
}

/// Baseline and actual cost store held in process memory.
///
/// All writes take a single lock, so an approval commit is applied
/// atomically with respect to every other operation.
#[derive(Debug, Default)]
pub struct InMemoryBudgetStore {
    state: RwLock<State>,
}

impl InMemoryBudgetStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BudgetStore for InMemoryBudgetStore {
    async fn insert_baseline(&self, baseline: BudgetBaseline) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        if state.baselines.contains_key(&baseline.id) {
            return Err(StoreError::UniqueViolation(format!(
                "baseline id {}",
                baseline.id
            )));
        }
        if state
            .project_baselines(baseline.project_id)
            .any(|existing| existing.version_number == baseline.version_number)
        {
            return Err(StoreError::UniqueViolation(format!(
                "project {} version {}",
                baseline.project_id, baseline.version_number
            )));
        }
        if baseline.status != BaselineStatus::Superseded
            && state
                .find_with_status(baseline.project_id, baseline.status)
                .is_some()
        {
            return Err(StoreError::UniqueViolation(format!(
                "project {} already has a {} baseline",
                baseline.project_id, baseline.status
            )));
        }

        debug!(baseline_id = %baseline.id, "Inserting baseline");
        state.baselines.insert(baseline.id, baseline);
        Ok(())
    }

    async fn get_baseline(&self, id: BaselineId) -> Result<Option<BudgetBaseline>, StoreError> {
        Ok(self.state.read().await.baselines.get(&id).cloned())
    }

    async fn list_baselines(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<BudgetBaseline>, StoreError> {
        let state = self.state.read().await;
        let mut baselines: Vec<BudgetBaseline> =
            state.project_baselines(project_id).cloned().collect();
        baselines.sort_by_key(|baseline| baseline.version_number);
        Ok(baselines)
    }

    async fn save_draft(&self, baseline: BudgetBaseline) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.stored_draft(baseline.id)?;
        if baseline.status != BaselineStatus::Draft {
            return Err(StoreError::NotDraft(baseline.id));
        }

        state.baselines.insert(baseline.id, baseline);
        Ok(())
    }

    async fn delete_draft(&self, id: BaselineId) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.stored_draft(id)?;
        state.baselines.remove(&id);
        Ok(())
    }

    async fn commit_approval(&self, commit: ApprovalCommit) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let project_id = commit.project_id();

        let current = state
            .find_with_status(project_id, BaselineStatus::Approved)
            .map(|baseline| baseline.id);
        if current != commit.expected_current() {
            return Err(StoreError::ApprovalConflict { project_id });
        }
        let stored = state
            .baselines
            .get(&commit.approved.id)
            .ok_or(StoreError::BaselineNotFound(commit.approved.id))?;
        if !BaselineLifecycle::is_valid_transition(stored.status, commit.approved.status) {
            return Err(StoreError::NotDraft(commit.approved.id));
        }
        if !commit.matches_draft(stored) {
            debug!(baseline_id = %commit.approved.id, "Draft changed since approval was built");
            return Err(StoreError::ApprovalConflict { project_id });
        }

        if let Some(superseded) = commit.superseded {
            state.baselines.insert(superseded.id, superseded);
        }
        debug!(baseline_id = %commit.approved.id, "Committing approval");
        state.baselines.insert(commit.approved.id, commit.approved);
        Ok(())
    }

    async fn insert_actual(&self, actual: ActualCost) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.actuals.contains_key(&actual.id) {
            return Err(StoreError::UniqueViolation(format!(
                "actual cost id {}",
                actual.id
            )));
        }
        state.actuals.insert(actual.id, actual);
        Ok(())
    }

    async fn get_actual(&self, id: ActualCostId) -> Result<Option<ActualCost>, StoreError> {
        Ok(self.state.read().await.actuals.get(&id).cloned())
    }

    async fn update_actual(&self, actual: ActualCost) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let slot = state
            .actuals
            .get_mut(&actual.id)
            .ok_or(StoreError::ActualNotFound(actual.id))?;
        *slot = actual;
        Ok(())
    }

    async fn delete_actual(&self, id: ActualCostId) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .actuals
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::ActualNotFound(id))
    }

    async fn list_actuals(
        &self,
        project_id: ProjectId,
        period: Option<Period>,
    ) -> Result<Vec<ActualCost>, StoreError> {
        let state = self.state.read().await;
        let mut actuals: Vec<ActualCost> = state
            .actuals
            .values()
            .filter(|actual| actual.project_id == project_id)
            .filter(|actual| period.is_none_or(|period| actual.overlaps(&period)))
            .cloned()
            .collect();
        actuals.sort_by(|a, b| {
            (a.period_start, a.created_at, a.id).cmp(&(b.period_start, b.created_at, b.id))
        });
        Ok(actuals)
    }
}
