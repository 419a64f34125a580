//! End-to-end budget service tests over the in-memory collaborators.

#![allow(clippy::too_many_lines)]

mod common;

use costline_core::budget::{
    ActualSource, BaselineStatus, BudgetError, CategoryAmounts, CostSuggestion,
    CreateActualInput, CreateBaselineInput, UpdateActualInput, UpdateBaselineInput,
};
use costline_core::derivation::{AllocationRecord, DeltaDirection, RateSource};
use costline_core::evm::ForecastStatus;
use costline_core::policy::{
    CostFallbackBehavior, DerivationMode, EacFormula, EffectiveBudgetPolicy,
};
use costline_shared::types::{ProjectId, UserId};
use costline_store::ProgressEntry;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{Harness, date};

fn baseline_input(project_id: ProjectId, total: Decimal) -> CreateBaselineInput {
    CreateBaselineInput {
        project_id,
        baseline_total: total,
        baseline_by_category: None,
        created_by: UserId::new(),
    }
}

fn actual_input(project_id: ProjectId, total: Decimal) -> CreateActualInput {
    CreateActualInput {
        project_id,
        period_start: date(2026, 1, 1),
        period_end: date(2026, 1, 31),
        actual_total: total,
        actual_by_category: CategoryAmounts::new(),
        created_by: UserId::new(),
    }
}

fn allocation(week_start: chrono::NaiveDate, rate: Option<Decimal>) -> AllocationRecord {
    AllocationRecord {
        user_id: UserId::new(),
        week_start,
        allocation_percent: dec!(50),
        availability_percent: dec!(100),
        rate_override: None,
        resource_default_rate: rate,
    }
}

#[tokio::test]
async fn test_first_baseline_is_version_one_draft() {
    let harness = Harness::new();
    let project_id = ProjectId::new();

    let baseline = harness
        .service
        .create_baseline(baseline_input(project_id, dec!(100000)))
        .await
        .unwrap();

    assert_eq!(baseline.version_number, 1);
    assert_eq!(baseline.status, BaselineStatus::Draft);
}

#[tokio::test]
async fn test_non_positive_baseline_rejected() {
    let harness = Harness::new();
    let result = harness
        .service
        .create_baseline(baseline_input(ProjectId::new(), Decimal::ZERO))
        .await;
    assert!(matches!(
        result,
        Err(BudgetError::NonPositiveBaselineTotal(_))
    ));
}

#[tokio::test]
async fn test_approval_supersedes_previous() {
    let harness = Harness::new();
    let service = &harness.service;
    let project_id = ProjectId::new();
    let approver = UserId::new();

    let a = service
        .create_baseline(baseline_input(project_id, dec!(100000)))
        .await
        .unwrap();
    service.approve_baseline(a.id, approver).await.unwrap();

    let b = service
        .create_baseline(baseline_input(project_id, dec!(120000)))
        .await
        .unwrap();
    assert_eq!(b.version_number, 2);
    let approved = service.approve_baseline(b.id, approver).await.unwrap();
    assert_eq!(approved.status, BaselineStatus::Approved);
    assert_eq!(approved.approved_by, Some(approver));

    let a = service.get_baseline(a.id).await.unwrap();
    assert_eq!(a.status, BaselineStatus::Superseded);
    assert_eq!(a.superseded_by, Some(approver));
    assert!(a.superseded_at.is_some());

    let baselines = service.list_baselines(project_id).await.unwrap();
    let versions: Vec<u32> = baselines.iter().map(|b| b.version_number).collect();
    assert_eq!(versions, vec![1, 2]);
    assert_eq!(
        baselines
            .iter()
            .filter(|b| b.status == BaselineStatus::Approved)
            .count(),
        1
    );

    let summary = service.get_summary(project_id).await.unwrap();
    assert_eq!(summary.baseline.map(|b| b.id), Some(b.id));
}

#[tokio::test]
async fn test_non_draft_baselines_are_immutable() {
    let harness = Harness::new();
    let service = &harness.service;
    let project_id = ProjectId::new();

    let a = service
        .create_baseline(baseline_input(project_id, dec!(100)))
        .await
        .unwrap();
    service.approve_baseline(a.id, UserId::new()).await.unwrap();

    let update = service
        .update_baseline(
            a.id,
            UpdateBaselineInput {
                baseline_total: Some(dec!(200)),
                baseline_by_category: None,
            },
        )
        .await;
    assert!(matches!(update, Err(BudgetError::InvalidState { .. })));

    let approve = service.approve_baseline(a.id, UserId::new()).await;
    assert!(matches!(approve, Err(BudgetError::InvalidState { .. })));

    let delete = service.delete_baseline(a.id).await;
    assert!(matches!(delete, Err(BudgetError::InvalidState { .. })));
}

#[tokio::test]
async fn test_draft_update_and_delete() {
    let harness = Harness::new();
    let service = &harness.service;
    let project_id = ProjectId::new();

    let draft = service
        .create_baseline(baseline_input(project_id, dec!(100)))
        .await
        .unwrap();
    let updated = service
        .update_baseline(
            draft.id,
            UpdateBaselineInput {
                baseline_total: Some(dec!(250)),
                baseline_by_category: Some(
                    [("labor".to_string(), dec!(250))].into_iter().collect(),
                ),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.baseline_total, dec!(250));
    assert_eq!(service.get_baseline(draft.id).await.unwrap(), updated);

    let second = service
        .create_baseline(baseline_input(project_id, dec!(300)))
        .await;
    assert!(matches!(
        second,
        Err(BudgetError::DraftAlreadyExists { .. })
    ));

    service.delete_baseline(draft.id).await.unwrap();
    assert!(matches!(
        service.get_baseline(draft.id).await,
        Err(BudgetError::BaselineNotFound(_))
    ));
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let harness = Harness::new();
    let service = &harness.service;

    let baseline = service
        .approve_baseline(costline_shared::types::BaselineId::new(), UserId::new())
        .await;
    assert!(matches!(baseline, Err(BudgetError::BaselineNotFound(_))));

    let actual = service
        .delete_actual(costline_shared::types::ActualCostId::new())
        .await;
    assert!(matches!(actual, Err(BudgetError::ActualNotFound(_))));
}

#[tokio::test]
async fn test_actual_round_trip() {
    let harness = Harness::new();
    let service = &harness.service;
    let project_id = ProjectId::new();

    let created = service
        .add_actual(actual_input(project_id, dec!(1234.56)))
        .await
        .unwrap();
    assert_eq!(created.source, ActualSource::Manual);
    assert_eq!(service.get_actual(created.id).await.unwrap(), created);

    let editor = UserId::new();
    let updated = service
        .update_actual(
            created.id,
            UpdateActualInput {
                period_start: None,
                period_end: Some(date(2026, 2, 15)),
                actual_total: Some(dec!(2000)),
                actual_by_category: None,
                updated_by: editor,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.actual_total, dec!(2000));
    assert_eq!(updated.period_end, date(2026, 2, 15));
    assert_eq!(updated.updated_by, editor);
    assert_eq!(updated.created_by, created.created_by);

    let listed = service.list_actuals(project_id).await.unwrap();
    assert_eq!(listed, vec![updated.clone()]);

    service.delete_actual(created.id).await.unwrap();
    assert!(service.list_actuals(project_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_actual_validation() {
    let harness = Harness::new();
    let service = &harness.service;
    let project_id = ProjectId::new();

    let mut inverted = actual_input(project_id, dec!(10));
    inverted.period_start = date(2026, 2, 1);
    assert!(matches!(
        service.add_actual(inverted).await,
        Err(BudgetError::InvalidPeriod(_))
    ));

    assert!(matches!(
        service.add_actual(actual_input(project_id, dec!(-0.01))).await,
        Err(BudgetError::NegativeActualTotal(_))
    ));

    let created = service
        .add_actual(actual_input(project_id, Decimal::ZERO))
        .await
        .unwrap();
    let result = service
        .update_actual(
            created.id,
            UpdateActualInput {
                period_start: Some(date(2026, 3, 1)),
                period_end: None,
                actual_total: None,
                actual_by_category: None,
                updated_by: UserId::new(),
            },
        )
        .await;
    assert!(matches!(result, Err(BudgetError::InvalidPeriod(_))));
}

#[tokio::test]
async fn test_summary_variance_and_evm() {
    let harness = Harness::new();
    let service = &harness.service;
    let project_id = ProjectId::new();

    let baseline = service
        .create_baseline(CreateBaselineInput {
            baseline_by_category: Some(
                [
                    ("labor".to_string(), dec!(80000)),
                    ("travel".to_string(), dec!(20000)),
                ]
                .into_iter()
                .collect(),
            ),
            ..baseline_input(project_id, dec!(100000))
        })
        .await
        .unwrap();
    service
        .approve_baseline(baseline.id, UserId::new())
        .await
        .unwrap();

    let mut labor = actual_input(project_id, dec!(60000));
    labor.actual_by_category = [("labor".to_string(), dec!(60000))].into_iter().collect();
    service.add_actual(labor).await.unwrap();

    harness
        .progress
        .set_progress(
            project_id,
            ProgressEntry {
                percent_complete: Some(dec!(0.5)),
                planned_value_curve: Default::default(),
            },
        )
        .await;

    let summary = service.get_summary(project_id).await.unwrap();
    assert_eq!(summary.total_actual, dec!(60000));
    assert_eq!(summary.variance_total, dec!(-40000));
    assert_eq!(summary.variance_percent, Some(dec!(-40.0)));
    assert_eq!(summary.category_variances.len(), 2);
    assert_eq!(summary.category_variances[0].category, "labor");
    assert_eq!(summary.category_variances[0].variance, dec!(-20000));

    let ev = summary.ev.unwrap();
    assert_eq!(ev.ev, dec!(50000));
    assert_eq!(ev.eac, dec!(110000));
    assert_eq!(ev.cpi, Some(dec!(0.8333)));
    assert_eq!(ev.forecast_status, ForecastStatus::AtRisk);
}

#[tokio::test]
async fn test_summary_cpi_based_with_spi() {
    let mut policy = EffectiveBudgetPolicy::default();
    policy.forecasting_rules.eac_formula = EacFormula::CpiBased;
    policy.forecasting_rules.spi_enabled = true;
    let harness = Harness::with_policy(policy);
    let service = &harness.service;
    let project_id = ProjectId::new();

    let baseline = service
        .create_baseline(baseline_input(project_id, dec!(100000)))
        .await
        .unwrap();
    service
        .approve_baseline(baseline.id, UserId::new())
        .await
        .unwrap();
    service
        .add_actual(actual_input(project_id, dec!(60000)))
        .await
        .unwrap();
    harness
        .progress
        .set_progress(
            project_id,
            ProgressEntry {
                percent_complete: Some(dec!(0.5)),
                planned_value_curve: [(date(2000, 1, 1), dec!(40000))].into_iter().collect(),
            },
        )
        .await;

    let ev = service.get_summary(project_id).await.unwrap().ev.unwrap();
    assert_eq!(ev.eac, dec!(120000));
    assert_eq!(ev.etc, dec!(60000));
    assert_eq!(ev.spi, Some(dec!(1.25)));
    assert_eq!(ev.forecast_status, ForecastStatus::AtRisk);
}

#[tokio::test]
async fn test_summary_without_baseline_has_null_variance() {
    let harness = Harness::new();
    let project_id = ProjectId::new();
    harness
        .service
        .add_actual(actual_input(project_id, dec!(5000)))
        .await
        .unwrap();

    let summary = harness.service.get_summary(project_id).await.unwrap();
    assert!(summary.baseline.is_none());
    assert_eq!(summary.total_actual, dec!(5000));
    assert_eq!(summary.variance_total, Decimal::ZERO);
    assert_eq!(summary.variance_percent, None);
    assert!(summary.ev.is_none());
}

#[tokio::test]
async fn test_cost_suggestion_is_deterministic() {
    let harness = Harness::new();
    let project_id = ProjectId::new();
    harness
        .allocations
        .set_allocations(
            project_id,
            vec![
                allocation(date(2026, 1, 5), Some(dec!(100))),
                allocation(date(2026, 1, 12), Some(dec!(80))),
                allocation(date(2026, 1, 12), None),
            ],
        )
        .await;

    let first = harness
        .service
        .get_cost_suggestion(project_id, date(2026, 1, 1), date(2026, 1, 31))
        .await
        .unwrap();
    harness.service.cache().invalidate_all();
    let second = harness
        .service
        .get_cost_suggestion(project_id, date(2026, 1, 1), date(2026, 1, 31))
        .await
        .unwrap();
    let third = harness
        .service
        .get_cost_suggestion(project_id, date(2026, 1, 1), date(2026, 1, 31))
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(second, third);

    let CostSuggestion::Available {
        suggestion,
        comparison,
    } = first
    else {
        panic!("expected an available suggestion");
    };
    assert_eq!(suggestion.derived_total, dec!(3600));
    assert_eq!(suggestion.allocations_used, 2);
    assert_eq!(suggestion.skipped_no_rate, 1);
    assert_eq!(suggestion.weekly_breakdown.len(), 2);
    let skipped = suggestion.weekly_breakdown[1]
        .allocations
        .iter()
        .find(|line| line.excluded)
        .unwrap();
    assert_eq!(skipped.rate_source, RateSource::FallbackZero);
    assert_eq!(skipped.line_cost, Decimal::ZERO);
    assert_eq!(comparison.delta_direction, DeltaDirection::UnderReported);
}

#[tokio::test]
async fn test_use_zero_fallback_counts_lines() {
    let mut policy = EffectiveBudgetPolicy::default();
    policy.cost_derivation_rules.cost_fallback_behavior = CostFallbackBehavior::UseZero;
    let harness = Harness::with_policy(policy);
    let project_id = ProjectId::new();
    harness
        .allocations
        .set_allocations(project_id, vec![allocation(date(2026, 1, 5), None)])
        .await;

    let suggestion = harness
        .service
        .get_cost_suggestion(project_id, date(2026, 1, 5), date(2026, 1, 11))
        .await
        .unwrap();
    let CostSuggestion::Available { suggestion, .. } = suggestion else {
        panic!("expected an available suggestion");
    };
    assert_eq!(suggestion.derived_total, Decimal::ZERO);
    assert_eq!(suggestion.allocations_used, 1);
    assert_eq!(suggestion.skipped_no_rate, 0);
    assert_eq!(suggestion.weekly_breakdown[0].total_hours, dec!(20));
}

#[tokio::test]
async fn test_manual_only_policy_makes_suggestion_unavailable() {
    let harness = Harness::new();
    let project_id = ProjectId::new();
    let mut manual = EffectiveBudgetPolicy::default();
    manual.cost_derivation_rules.mode = DerivationMode::ManualOnly;
    harness.policies.set_policy(project_id, manual).await;
    harness
        .allocations
        .set_allocations(project_id, vec![allocation(date(2026, 1, 5), Some(dec!(100)))])
        .await;

    let suggestion = harness
        .service
        .get_cost_suggestion(project_id, date(2026, 1, 1), date(2026, 1, 31))
        .await
        .unwrap();
    assert!(!suggestion.is_available());
}

#[tokio::test]
async fn test_record_derived_actual_aligns_suggestion() {
    let harness = Harness::new();
    let service = &harness.service;
    let project_id = ProjectId::new();
    harness
        .allocations
        .set_allocations(project_id, vec![allocation(date(2026, 1, 5), Some(dec!(100)))])
        .await;

    let recorded = service
        .record_derived_actual(project_id, date(2026, 1, 5), date(2026, 1, 11), UserId::new())
        .await
        .unwrap();
    assert_eq!(recorded.source, ActualSource::Derived);
    assert_eq!(recorded.actual_total, dec!(2000));

    let CostSuggestion::Available { comparison, .. } = service
        .get_cost_suggestion(project_id, date(2026, 1, 5), date(2026, 1, 11))
        .await
        .unwrap()
    else {
        panic!("expected an available suggestion");
    };
    assert_eq!(comparison.existing_actual_total, dec!(2000));
    assert_eq!(comparison.delta, Decimal::ZERO);
    assert_eq!(comparison.delta_direction, DeltaDirection::Aligned);

    let summary = service.get_summary(project_id).await.unwrap();
    assert_eq!(summary.total_actual, dec!(2000));
}
