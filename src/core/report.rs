//! Aggregated figures derived from the ledger.
//!
//! The pure functions at the top of this module take entity models and never
//! touch the database; the `*_for_owner` functions load an owner's records and
//! hand them to the pure versions. Nothing here writes.

use crate::{
    core::{
        bill as bills, budget as budgets, card as cards,
        budget::BudgetStatus,
        payment::{self as payments, PaymentKind},
        period, spending,
    },
    entities::{bill, budget, credit_card, income_event, payment, spending_entry},
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDate};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Total spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// Category name
    pub category: String,
    /// Sum of the entries in this category
    pub total_amount: f64,
}

/// Income and expense for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBalance {
    /// Month number, 1 to 12
    pub month: u32,
    /// Sum of income events in the month
    pub income: f64,
    /// Sum of payments and spending entries in the month
    pub expense: f64,
}

/// A bill or card that still has something to pay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingPayment {
    /// Bill or card
    pub kind: PaymentKind,
    /// Bill name or bank name
    pub name: String,
    /// Outstanding amount
    pub amount: f64,
    /// Due date
    pub due_date: NaiveDate,
    /// Days from today until the due date (negative when overdue)
    pub days_remaining: i64,
    /// Whether the due date has passed
    pub overdue: bool,
}

/// Report kinds accepted by [`generate_report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    /// Income against expense for each month of a year
    MonthlyBalance,
    /// Spending per category within a year
    CategorySpending,
}

impl FromStr for ReportType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "monthly_balance" => Ok(Self::MonthlyBalance),
            "category_spending" => Ok(Self::CategorySpending),
            other => Err(Error::validation(format!("Invalid report type '{other}'"))),
        }
    }
}

/// A generated report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "report_type", rename_all = "snake_case")]
pub enum Report {
    /// Twelve monthly income/expense records
    MonthlyBalance {
        /// Year the report covers
        year: i32,
        /// One record per month, January first
        monthly_data: Vec<MonthlyBalance>,
    },
    /// Spending totals per category
    CategorySpending {
        /// Year the report covers
        year: i32,
        /// Totals, largest first
        category_data: Vec<CategoryTotal>,
    },
}

/// Everything the overview page shows, in one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// Budget and what is left of it
    pub budget: BudgetStatus,
    /// Unused credit across all cards ("total assets")
    pub total_card_headroom: f64,
    /// Budget plus card headroom
    pub total_resources: f64,
    /// Sum of all payments made
    pub total_paid: f64,
    /// Spending per category
    pub spending_summary: Vec<CategoryTotal>,
    /// Outstanding bills and cards by due date
    pub upcoming_payments: Vec<UpcomingPayment>,
}

/// Sum over cards of `max(0, card_limit - current_balance)`.
#[must_use]
pub fn total_card_headroom(cards: &[credit_card::Model]) -> f64 {
    cards.iter().map(credit_card::Model::headroom).sum()
}

/// Budget amount (zero without a budget) plus total card headroom.
#[must_use]
pub fn total_resources(budget: Option<&budget::Model>, cards: &[credit_card::Model]) -> f64 {
    budget.map_or(0.0, |b| b.initial_amount) + total_card_headroom(cards)
}

/// Groups entries by category and sums them, largest total first.
#[must_use]
pub fn spending_by_category(entries: &[spending_entry::Model]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for entry in entries {
        *totals.entry(entry.category.as_str()).or_default() += entry.amount;
    }

    let mut summary: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total_amount)| CategoryTotal {
            category: category.to_string(),
            total_amount,
        })
        .collect();
    summary.sort_by(|a, b| {
        b.total_amount
            .total_cmp(&a.total_amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    summary
}

/// Buckets income and expenses of `year` into twelve months.
///
/// Records outside `year` are ignored.
#[must_use]
pub fn monthly_balance(
    year: i32,
    incomes: &[income_event::Model],
    payments: &[payment::Model],
    spending: &[spending_entry::Model],
) -> Vec<MonthlyBalance> {
    let mut months: Vec<MonthlyBalance> = (1..=12)
        .map(|month| MonthlyBalance {
            month,
            income: 0.0,
            expense: 0.0,
        })
        .collect();

    let index = |ts: &chrono::DateTime<chrono::Utc>| {
        (ts.year() == year).then(|| ts.month0() as usize)
    };

    for income in incomes {
        if let Some(i) = index(&income.timestamp) {
            months[i].income += income.amount;
        }
    }
    for payment in payments {
        if let Some(i) = index(&payment.timestamp) {
            months[i].expense += payment.amount;
        }
    }
    for entry in spending {
        if let Some(i) = index(&entry.timestamp) {
            months[i].expense += entry.amount;
        }
    }

    months
}

/// Outstanding bills and cards with days until due, soonest first.
#[must_use]
pub fn upcoming_payments(
    bills: &[bill::Model],
    cards: &[credit_card::Model],
    today: NaiveDate,
) -> Vec<UpcomingPayment> {
    let upcoming = |kind, name: &str, amount, due_date: NaiveDate| {
        let days_remaining = (due_date - today).num_days();
        UpcomingPayment {
            kind,
            name: name.to_string(),
            amount,
            due_date,
            days_remaining,
            overdue: days_remaining < 0,
        }
    };

    let mut result: Vec<UpcomingPayment> = bills
        .iter()
        .filter(|b| b.is_outstanding())
        .map(|b| upcoming(PaymentKind::Bill, &b.bill_name, b.amount, b.end_date))
        .chain(
            cards
                .iter()
                .filter(|c| c.current_balance > 0.0)
                .map(|c| upcoming(PaymentKind::Card, &c.bank_name, c.current_balance, c.due_date_end)),
        )
        .collect();

    result.sort_by(|a, b| {
        a.days_remaining
            .cmp(&b.days_remaining)
            .then_with(|| a.name.cmp(&b.name))
    });
    result
}

/// Unused credit across the owner's cards.
pub async fn card_headroom_for_owner(db: &DatabaseConnection, owner_id: i64) -> Result<f64> {
    let cards = cards::list_cards(db, owner_id).await?;
    Ok(total_card_headroom(&cards))
}

/// Budget plus card headroom for the owner.
pub async fn resources_for_owner(db: &DatabaseConnection, owner_id: i64) -> Result<f64> {
    let budget = budgets::get_budget(db, owner_id).await?;
    let cards = cards::list_cards(db, owner_id).await?;
    Ok(total_resources(budget.as_ref(), &cards))
}

/// Spending per category over the owner's whole history.
pub async fn spending_summary(db: &DatabaseConnection, owner_id: i64) -> Result<Vec<CategoryTotal>> {
    let entries = spending::list_spending(db, owner_id).await?;
    Ok(spending_by_category(&entries))
}

/// Twelve monthly income/expense records for `year`.
pub async fn monthly_balance_for_owner(
    db: &DatabaseConnection,
    owner_id: i64,
    year: i32,
) -> Result<Vec<MonthlyBalance>> {
    let (start, end) = period::year_bounds(year)?;
    let incomes = budgets::income_events_between(db, owner_id, start, end).await?;
    let payments = payments::payments_between(db, owner_id, start, end).await?;
    let spending = spending::spending_between(db, owner_id, start, end).await?;
    Ok(monthly_balance(year, &incomes, &payments, &spending))
}

/// Outstanding bills and cards for the owner, soonest first.
pub async fn upcoming_payments_for_owner(
    db: &DatabaseConnection,
    owner_id: i64,
    today: NaiveDate,
) -> Result<Vec<UpcomingPayment>> {
    let bills = bills::list_unpaid_bills(db, owner_id).await?;
    let cards = cards::list_unpaid_cards(db, owner_id).await?;
    Ok(upcoming_payments(&bills, &cards, today))
}

/// Builds a report of `report_type` for `year`.
///
/// A category report for a year without any spending is `NotFound`.
pub async fn generate_report(
    db: &DatabaseConnection,
    owner_id: i64,
    report_type: ReportType,
    year: i32,
) -> Result<Report> {
    match report_type {
        ReportType::MonthlyBalance => Ok(Report::MonthlyBalance {
            year,
            monthly_data: monthly_balance_for_owner(db, owner_id, year).await?,
        }),
        ReportType::CategorySpending => {
            let (start, end) = period::year_bounds(year)?;
            let entries = spending::spending_between(db, owner_id, start, end).await?;
            if entries.is_empty() {
                return Err(Error::not_found("Spending data", year.to_string()));
            }
            Ok(Report::CategorySpending {
                year,
                category_data: spending_by_category(&entries),
            })
        }
    }
}

/// Collects the overview figures for the owner.
pub async fn dashboard(
    db: &DatabaseConnection,
    owner_id: i64,
    today: NaiveDate,
) -> Result<Dashboard> {
    let budget = budgets::get_budget(db, owner_id).await?;
    let all_cards = cards::list_cards(db, owner_id).await?;
    let unpaid_bills = bills::list_unpaid_bills(db, owner_id).await?;
    let entries = spending::list_spending(db, owner_id).await?;
    let paid = payments::list_payments(db, owner_id).await?;

    let spent: f64 = entries.iter().map(|e| e.amount).sum();
    let initial_budget = budget.as_ref().map_or(0.0, |b| b.initial_amount);
    let status = BudgetStatus {
        initial_budget,
        remaining_amount: if budget.is_some() {
            initial_budget - spent
        } else {
            0.0
        },
    };

    Ok(Dashboard {
        budget: status,
        total_card_headroom: total_card_headroom(&all_cards),
        total_resources: total_resources(budget.as_ref(), &all_cards),
        total_paid: paid.iter().map(|p| p.amount).sum(),
        spending_summary: spending_by_category(&entries),
        upcoming_payments: upcoming_payments(&unpaid_bills, &all_cards, today),
    })
}
