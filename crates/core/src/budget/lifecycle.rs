//! Baseline lifecycle state machine.
//!
//! Transitions are computed here and applied by the [`BudgetStore`]
//! collaborator. Approval produces an [`ApprovalCommit`] that the store must
//! apply atomically.
//!
//! [`BudgetStore`]: crate::ports::BudgetStore

use chrono::{DateTime, Utc};
use costline_shared::types::{BaselineId, ProjectId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::BudgetError;
use super::types::{
    BaselineStatus, BudgetBaseline, CategoryAmounts, CreateBaselineInput, UpdateBaselineInput,
};

/// The pair of rows an approval writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalCommit {
    /// The draft, now approved.
    pub approved: BudgetBaseline,
    /// The previously approved baseline, now superseded.
    pub superseded: Option<BudgetBaseline>,
    /// `updated_at` of the draft as read when the approval was built.
    pub draft_updated_at: DateTime<Utc>,
}

impl ApprovalCommit {
    /// Project both rows belong to.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.approved.project_id
    }

    /// The approved baseline id the store must still hold for the commit to apply.
    #[must_use]
    pub fn expected_current(&self) -> Option<BaselineId> {
        self.superseded.as_ref().map(|baseline| baseline.id)
    }

    /// Returns true if `stored` still holds the draft content this approval
    /// was built from.
    #[must_use]
    pub fn matches_draft(&self, stored: &BudgetBaseline) -> bool {
        stored.id == self.approved.id
            && stored.updated_at == self.draft_updated_at
            && stored.baseline_total == self.approved.baseline_total
            && stored.baseline_by_category == self.approved.baseline_by_category
    }
}

/// Stateless manager for baseline transitions.
pub struct BaselineLifecycle;

impl BaselineLifecycle {
    /// Next version number for a project given its existing baselines.
    #[must_use]
    pub fn next_version(existing: &[BudgetBaseline]) -> u32 {
        existing
            .iter()
            .map(|baseline| baseline.version_number)
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }

    /// Builds a new draft baseline.
    ///
    /// # Errors
    ///
    /// - [`BudgetError::NonPositiveBaselineTotal`] if the total is not positive
    /// - [`BudgetError::NegativeCategoryAmount`] for a negative category amount
    /// - [`BudgetError::DraftAlreadyExists`] if the project already has a draft
    pub fn create(
        input: CreateBaselineInput,
        existing: &[BudgetBaseline],
        now: DateTime<Utc>,
    ) -> Result<BudgetBaseline, BudgetError> {
        let baseline_by_category = input.baseline_by_category.unwrap_or_default();
        validate_amounts(input.baseline_total, &baseline_by_category)?;

        if let Some(draft) = existing
            .iter()
            .find(|baseline| baseline.status == BaselineStatus::Draft)
        {
            return Err(BudgetError::DraftAlreadyExists {
                project_id: input.project_id,
                draft_id: draft.id,
            });
        }

        Ok(BudgetBaseline {
            id: BaselineId::new(),
            project_id: input.project_id,
            baseline_total: input.baseline_total,
            baseline_by_category,
            status: BaselineStatus::Draft,
            version_number: Self::next_version(existing),
            approved_by: None,
            approved_at: None,
            superseded_at: None,
            superseded_by: None,
            created_by: input.created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies field changes to a draft.
    ///
    /// # Errors
    ///
    /// - [`BudgetError::InvalidState`] if the baseline is not a draft
    /// - validation errors as for [`BaselineLifecycle::create`]
    pub fn update(
        baseline: &BudgetBaseline,
        input: UpdateBaselineInput,
        now: DateTime<Utc>,
    ) -> Result<BudgetBaseline, BudgetError> {
        Self::ensure_draft(baseline, "update")?;

        let mut updated = baseline.clone();
        if let Some(total) = input.baseline_total {
            updated.baseline_total = total;
        }
        if let Some(categories) = input.baseline_by_category {
            updated.baseline_by_category = categories;
        }
        validate_amounts(updated.baseline_total, &updated.baseline_by_category)?;
        updated.updated_at = now;

        Ok(updated)
    }

    /// Checks that a baseline may be deleted.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError::InvalidState`] unless the baseline is a draft.
    pub fn ensure_deletable(baseline: &BudgetBaseline) -> Result<(), BudgetError> {
        Self::ensure_draft(baseline, "delete")
    }

    /// Approves a draft, superseding the project's currently approved baseline.
    ///
    /// `existing` is the project's baseline list as read before the commit; the
    /// returned commit records which approved baseline it expects to replace.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError::InvalidState`] if the target is not a draft.
    pub fn approve(
        target: &BudgetBaseline,
        existing: &[BudgetBaseline],
        approver: UserId,
        now: DateTime<Utc>,
    ) -> Result<ApprovalCommit, BudgetError> {
        Self::ensure_draft(target, "approve")?;

        let superseded = existing
            .iter()
            .find(|baseline| {
                baseline.status == BaselineStatus::Approved && baseline.id != target.id
            })
            .map(|current| BudgetBaseline {
                status: BaselineStatus::Superseded,
                superseded_at: Some(now),
                superseded_by: Some(approver),
                updated_at: now,
                ..current.clone()
            });

        let approved = BudgetBaseline {
            status: BaselineStatus::Approved,
            approved_by: Some(approver),
            approved_at: Some(now),
            updated_at: now,
            ..target.clone()
        };

        Ok(ApprovalCommit {
            approved,
            superseded,
            draft_updated_at: target.updated_at,
        })
    }

    /// Returns true if `target` is no longer a draft because another approval
    /// for its project committed at or after `since`.
    ///
    /// Such a caller lost a race rather than asking for an invalid transition.
    #[must_use]
    pub fn lost_approval_race(
        target: &BudgetBaseline,
        existing: &[BudgetBaseline],
        since: DateTime<Utc>,
    ) -> bool {
        target.status != BaselineStatus::Draft
            && existing.iter().any(|baseline| {
                baseline.status == BaselineStatus::Approved
                    && baseline.approved_at.is_some_and(|at| at >= since)
            })
    }

    /// Returns true if `from → to` is a valid status transition.
    ///
    /// Valid transitions:
    /// - Draft → Approved (approve)
    /// - Approved → Superseded (a later approval)
    #[must_use]
    pub fn is_valid_transition(from: BaselineStatus, to: BaselineStatus) -> bool {
        matches!(
            (from, to),
            (BaselineStatus::Draft, BaselineStatus::Approved)
                | (BaselineStatus::Approved, BaselineStatus::Superseded)
        )
    }

    fn ensure_draft(baseline: &BudgetBaseline, action: &'static str) -> Result<(), BudgetError> {
        if baseline.status.is_editable() {
            Ok(())
        } else {
            Err(BudgetError::InvalidState {
                baseline_id: baseline.id,
                status: baseline.status,
                action,
            })
        }
    }
}

fn validate_amounts(total: Decimal, categories: &CategoryAmounts) -> Result<(), BudgetError> {
    if total <= Decimal::ZERO {
        return Err(BudgetError::NonPositiveBaselineTotal(total));
    }
    if let Some((category, amount)) = categories.iter().find(|(_, amount)| **amount < Decimal::ZERO)
    {
        return Err(BudgetError::NegativeCategoryAmount {
            category: category.clone(),
            amount: *amount,
        });
    }
    Ok(())
}
