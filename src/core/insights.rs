//! Home-page advice derived from the current month's spending.

use crate::{
    config::settings::LedgerSettings,
    core::{
        budget as budgets, period,
        report::spending_by_category,
        spending::{self, SpendingCategory},
    },
    entities::spending_entry,
    errors::Result,
};
use chrono::{Datelike, NaiveDate};
use sea_orm::DatabaseConnection;
use serde::Serialize;

/// One piece of advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Insight {
    /// This month's spending reached the budget alert ratio
    BudgetNearlyExhausted,
    /// Education is the largest category this month
    EducationLeads,
    /// Nothing was logged this month
    NoSpendingYet,
    /// Sport spending exceeded the sport alert ratio of the budget
    SportSpendingHigh,
}

impl Insight {
    /// Message shown to the user.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::BudgetNearlyExhausted => {
                "Your resources are nearly exhausted, keep an eye on your spending."
            }
            Self::EducationLeads => {
                "Education is your largest spending category this month."
            }
            Self::NoSpendingYet => "You have not logged any spending yet this month.",
            Self::SportSpendingHigh => "Your sport spending has gone up this month.",
        }
    }
}

/// Derives advice from `budget_amount` and this month's entries.
#[must_use]
pub fn derive_insights(
    budget_amount: f64,
    month_entries: &[spending_entry::Model],
    settings: &LedgerSettings,
) -> Vec<Insight> {
    let mut insights = Vec::new();
    let total: f64 = month_entries.iter().map(|e| e.amount).sum();

    if total >= budget_amount * settings.budget_alert_ratio {
        insights.push(Insight::BudgetNearlyExhausted);
    }

    // Education has to lead outright; a shared top spot does not count
    let summary = spending_by_category(month_entries);
    let education_leads = match summary.as_slice() {
        [top, rest @ ..] => {
            top.category == SpendingCategory::Education.as_str()
                && rest
                    .first()
                    .is_none_or(|next| next.total_amount < top.total_amount)
        }
        [] => false,
    };
    if education_leads {
        insights.push(Insight::EducationLeads);
    }

    if month_entries.is_empty() {
        insights.push(Insight::NoSpendingYet);
    }

    let sport: f64 = month_entries
        .iter()
        .filter(|e| e.category == SpendingCategory::Sport.as_str())
        .map(|e| e.amount)
        .sum();
    if sport > budget_amount * settings.sport_alert_ratio {
        insights.push(Insight::SportSpendingHigh);
    }

    insights
}

/// Advice for the owner for the month containing `today`.
///
/// Fails with `NotFound` when the owner has no budget.
pub async fn insights_for_owner(
    db: &DatabaseConnection,
    owner_id: i64,
    today: NaiveDate,
    settings: &LedgerSettings,
) -> Result<Vec<Insight>> {
    let budget = budgets::require_budget(db, owner_id).await?;
    let (start, end) = period::month_bounds(today.year(), today.month())?;
    let entries = spending::spending_between(db, owner_id, start, end).await?;
    Ok(derive_insights(budget.initial_amount, &entries, settings))
}
