//! Baseline vs actual variance calculations.

use costline_shared::types::money::{percent_of, round_percent};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{ActualCost, CategoryAmounts};

/// Decimal places reported for variance percentages.
pub const VARIANCE_PERCENT_DP: u32 = 1;

/// Variance status classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceStatus {
    /// Spent less than planned.
    Favorable,
    /// Spent more than planned.
    Unfavorable,
    /// Spent exactly as planned.
    OnBudget,
}

impl VarianceStatus {
    /// Classifies an over-budget-positive variance.
    #[must_use]
    pub fn from_variance(variance: Decimal) -> Self {
        match variance.cmp(&Decimal::ZERO) {
            std::cmp::Ordering::Greater => Self::Unfavorable,
            std::cmp::Ordering::Less => Self::Favorable,
            std::cmp::Ordering::Equal => Self::OnBudget,
        }
    }
}

/// Project-level variance between the baseline and recorded actuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineVariance {
    /// `total_actual - baseline_total`; positive means over budget.
    pub variance_total: Decimal,
    /// Variance as a percent of the baseline; `None` without a positive baseline.
    pub variance_percent: Option<Decimal>,
}

impl BaselineVariance {
    /// Calculates variance against an optional baseline total.
    ///
    /// Without a baseline the variance is zero and the percentage undefined.
    #[must_use]
    pub fn calculate(baseline_total: Option<Decimal>, total_actual: Decimal) -> Self {
        let Some(baseline_total) = baseline_total else {
            return Self {
                variance_total: Decimal::ZERO,
                variance_percent: None,
            };
        };

        let variance_total = total_actual - baseline_total;
        let variance_percent = percent_of(variance_total, baseline_total)
            .map(|percent| round_percent(percent, VARIANCE_PERCENT_DP));

        Self {
            variance_total,
            variance_percent,
        }
    }
}

/// Variance for a single cost category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryVariance {
    /// Category name.
    pub category: String,
    /// Planned amount (zero when the baseline has no entry).
    pub budgeted: Decimal,
    /// Sum of actuals recorded against the category.
    pub actual: Decimal,
    /// `actual - budgeted`.
    pub variance: Decimal,
    /// Variance as a percent of the planned amount.
    pub variance_percent: Option<Decimal>,
    /// Classification.
    pub status: VarianceStatus,
}

/// Computes per-category variance over the union of baseline and actual categories.
#[must_use]
pub fn category_variances(
    baseline_by_category: &CategoryAmounts,
    actuals: &[ActualCost],
) -> Vec<CategoryVariance> {
    let mut spent = CategoryAmounts::new();
    for actual in actuals {
        for (category, amount) in &actual.actual_by_category {
            *spent.entry(category.clone()).or_default() += *amount;
        }
    }

    let mut categories: Vec<&String> = baseline_by_category.keys().chain(spent.keys()).collect();
    categories.sort();
    categories.dedup();

    categories
        .into_iter()
        .map(|category| {
            let budgeted = baseline_by_category
                .get(category)
                .copied()
                .unwrap_or_default();
            let actual = spent.get(category).copied().unwrap_or_default();
            let variance = actual - budgeted;
            CategoryVariance {
                category: category.clone(),
                budgeted,
                actual,
                variance,
                variance_percent: percent_of(variance, budgeted)
                    .map(|percent| round_percent(percent, VARIANCE_PERCENT_DP)),
                status: VarianceStatus::from_variance(variance),
            }
        })
        .collect()
}
