//! Property-based tests for BaselineLifecycle.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use costline_shared::types::{ProjectId, UserId};

use crate::budget::error::BudgetError;
use crate::budget::lifecycle::BaselineLifecycle;
use crate::budget::types::{BaselineStatus, BudgetBaseline, CreateBaselineInput};

fn arb_status() -> impl Strategy<Value = BaselineStatus> {
    prop_oneof![
        Just(BaselineStatus::Draft),
        Just(BaselineStatus::Approved),
        Just(BaselineStatus::Superseded),
    ]
}

fn arb_user() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId::from_uuid(Uuid::from_u128(n)))
}

/// Positive totals with cents.
fn arb_total() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn draft(project_id: ProjectId, total: Decimal, existing: &[BudgetBaseline]) -> BudgetBaseline {
    BaselineLifecycle::create(
        CreateBaselineInput {
            project_id,
            baseline_total: total,
            baseline_by_category: None,
            created_by: UserId::new(),
        },
        existing,
        Utc::now(),
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Repeated create/approve cycles yield versions 1..=n with one approved baseline.
    #[test]
    fn prop_versions_increase_and_one_approved(
        totals in prop::collection::vec(arb_total(), 1..12),
        approver in arb_user(),
    ) {
        let project_id = ProjectId::new();
        let mut baselines: Vec<BudgetBaseline> = Vec::new();

        for total in totals {
            let new_draft = draft(project_id, total, &baselines);
            baselines.push(new_draft.clone());

            let commit = BaselineLifecycle::approve(&new_draft, &baselines, approver, Utc::now())
                .unwrap();
            for baseline in &mut baselines {
                if baseline.id == commit.approved.id {
                    *baseline = commit.approved.clone();
                } else if Some(baseline.id) == commit.expected_current() {
                    if let Some(superseded) = &commit.superseded {
                        *baseline = superseded.clone();
                    }
                }
            }
        }

        let versions: Vec<u32> = baselines.iter().map(|b| b.version_number).collect();
        let expected: Vec<u32> = (1..=u32::try_from(baselines.len()).unwrap()).collect();
        prop_assert_eq!(versions, expected);

        let approved = baselines
            .iter()
            .filter(|b| b.status == BaselineStatus::Approved)
            .count();
        prop_assert_eq!(approved, 1);
        prop_assert_eq!(
            baselines.last().map(|b| b.status),
            Some(BaselineStatus::Approved)
        );
    }

    /// Only drafts may be updated, approved, or deleted.
    #[test]
    fn prop_only_drafts_are_mutable(
        status in arb_status(),
        total in arb_total(),
        approver in arb_user(),
    ) {
        let mut baseline = draft(ProjectId::new(), total, &[]);
        baseline.status = status;

        let update = BaselineLifecycle::update(&baseline, Default::default(), Utc::now());
        let approve = BaselineLifecycle::approve(&baseline, &[], approver, Utc::now());
        let delete = BaselineLifecycle::ensure_deletable(&baseline);

        if status == BaselineStatus::Draft {
            prop_assert!(update.is_ok());
            prop_assert!(approve.is_ok());
            prop_assert!(delete.is_ok());
        } else {
            let is_invalid_state = matches!(update, Err(BudgetError::InvalidState { .. }));
            prop_assert!(is_invalid_state);
            let is_invalid_state = matches!(approve, Err(BudgetError::InvalidState { .. }));
            prop_assert!(is_invalid_state);
            prop_assert!(delete.is_err());
        }
    }

    /// Non-positive totals are always rejected.
    #[test]
    fn prop_non_positive_total_rejected(cents in -1_000_000_000i64..=0) {
        let result = BaselineLifecycle::create(
            CreateBaselineInput {
                project_id: ProjectId::new(),
                baseline_total: Decimal::new(cents, 2),
                baseline_by_category: None,
                created_by: UserId::new(),
            },
            &[],
            Utc::now(),
        );
        let is_validation = matches!(result, Err(BudgetError::NonPositiveBaselineTotal(_)));
        prop_assert!(is_validation);
    }
}
