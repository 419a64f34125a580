//! Budget summary assembly.

use costline_shared::types::ProjectId;
use rust_decimal::Decimal;

use super::types::{ActualCost, BaselineStatus, BudgetBaseline, BudgetSummary};
use super::variance::{BaselineVariance, category_variances};
use crate::evm::{EvmCalculator, EvmInputs};
use crate::policy::EffectiveBudgetPolicy;

/// Progress data for a project as reported by the progress collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Fraction of work complete in `[0, 1]`.
    pub percent_complete: Option<Decimal>,
    /// Planned value as of today.
    pub planned_value: Option<Decimal>,
}

/// Combines baselines, actuals, policy, and progress into a [`BudgetSummary`].
pub struct BudgetSummaryAssembler;

impl BudgetSummaryAssembler {
    /// Picks the project's current baseline: the approved one, else the
    /// highest-version draft.
    #[must_use]
    pub fn current_baseline(baselines: &[BudgetBaseline]) -> Option<&BudgetBaseline> {
        baselines
            .iter()
            .find(|baseline| baseline.status == BaselineStatus::Approved)
            .or_else(|| {
                baselines
                    .iter()
                    .filter(|baseline| baseline.status == BaselineStatus::Draft)
                    .max_by_key(|baseline| baseline.version_number)
            })
    }

    /// Builds the summary.
    ///
    /// EVM runs only when the current baseline total is positive and
    /// `progress.percent_complete` is known; `policy` may be `None` when no
    /// EVM is needed.
    #[must_use]
    pub fn assemble(
        project_id: ProjectId,
        baselines: &[BudgetBaseline],
        actuals: Vec<ActualCost>,
        policy: Option<&EffectiveBudgetPolicy>,
        progress: ProgressSnapshot,
    ) -> BudgetSummary {
        let baseline = Self::current_baseline(baselines).cloned();
        let total_actual: Decimal = actuals.iter().map(|actual| actual.actual_total).sum();

        let variance = BaselineVariance::calculate(
            baseline.as_ref().map(|baseline| baseline.baseline_total),
            total_actual,
        );

        let category_variances = baseline
            .as_ref()
            .map(|baseline| category_variances(&baseline.baseline_by_category, &actuals))
            .unwrap_or_default();

        let ev = match (&baseline, policy, progress.percent_complete) {
            (Some(baseline), Some(policy), Some(percent_complete))
                if baseline.baseline_total > Decimal::ZERO =>
            {
                Some(EvmCalculator::calculate(
                    &EvmInputs {
                        bac: baseline.baseline_total,
                        ac: total_actual,
                        percent_complete,
                        planned_value: progress.planned_value,
                        variance_percent: variance.variance_percent,
                    },
                    &policy.forecasting_rules,
                    &policy.threshold_rules,
                ))
            }
            _ => None,
        };

        BudgetSummary {
            project_id,
            baseline,
            actuals,
            total_actual,
            variance_total: variance.variance_total,
            variance_percent: variance.variance_percent,
            category_variances,
            ev,
        }
    }
}
