//! Daily checks - bill reminders and low-budget alerts across all owners.
//!
//! A bill gets a reminder when it is unpaid, has reminders enabled, and is
//! either overdue or due in exactly `reminder_lead_days`. A bill is reminded
//! at most once per day; the day is stored in `last_notified_on`.
//! Delivering the reminders is left to the caller.

use crate::{
    config::settings::LedgerSettings,
    entities::{Bill, Owner, bill, owner},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

/// A bill that should be brought to its owner's attention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillReminder {
    /// Bill id
    pub bill_id: i64,
    /// Owner id
    pub owner_id: i64,
    /// Owner's identity key, where the reminder goes
    pub email: String,
    /// Name of the bill
    pub bill_name: String,
    /// Amount still due
    pub amount: f64,
    /// Due date
    pub due_date: NaiveDate,
    /// Days until due, negative when overdue
    pub days_until_due: i64,
}

impl BillReminder {
    /// Whether the due date has passed.
    #[must_use]
    pub const fn is_overdue(&self) -> bool {
        self.days_until_due < 0
    }
}

/// An owner whose budget is below the alert threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowBudgetAlert {
    /// Owner id
    pub owner_id: i64,
    /// Owner's identity key
    pub email: String,
    /// Current budget amount
    pub current_budget: f64,
    /// Threshold it fell below
    pub threshold: f64,
}

/// Everything produced by one run of the daily checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyCheckReport {
    /// Reminders produced (and recorded) today
    pub reminders: Vec<BillReminder>,
    /// Owners with a low budget
    pub alerts: Vec<LowBudgetAlert>,
}

/// Decides whether `bill` is due for a reminder on `today`.
#[must_use]
pub fn should_remind(bill: &bill::Model, today: NaiveDate, lead_days: i64) -> bool {
    if !bill.notify || !bill.is_outstanding() {
        return false;
    }
    if bill.last_notified_on == Some(today) {
        return false;
    }
    let days_until_due = (bill.end_date - today).num_days();
    days_until_due < 0 || days_until_due == lead_days
}

async fn owner_emails<C>(db: &C) -> Result<HashMap<i64, String>>
where
    C: ConnectionTrait,
{
    let owners = Owner::find().all(db).await?;
    Ok(owners
        .into_iter()
        .map(|owner::Model { id, email, .. }| (id, email))
        .collect())
}

/// Finds the bills due for a reminder on `today` without recording anything.
pub async fn pending_bill_reminders<C>(
    db: &C,
    today: NaiveDate,
    lead_days: i64,
) -> Result<Vec<BillReminder>>
where
    C: ConnectionTrait,
{
    let emails = owner_emails(db).await?;
    let candidates = Bill::find()
        .filter(bill::Column::IsPaid.eq(false))
        .filter(bill::Column::Notify.eq(true))
        .order_by_asc(bill::Column::EndDate)
        .order_by_asc(bill::Column::Id)
        .all(db)
        .await?;

    Ok(candidates
        .into_iter()
        .filter(|b| should_remind(b, today, lead_days))
        .map(|b| BillReminder {
            bill_id: b.id,
            owner_id: b.owner_id,
            email: emails.get(&b.owner_id).cloned().unwrap_or_default(),
            days_until_due: (b.end_date - today).num_days(),
            bill_name: b.bill_name,
            amount: b.amount,
            due_date: b.end_date,
        })
        .collect())
}

/// Finds the pending reminders and marks each bill as reminded today.
///
/// Runs in one transaction; a second call on the same day returns nothing.
pub async fn send_bill_reminders(
    db: &DatabaseConnection,
    today: NaiveDate,
    lead_days: i64,
) -> Result<Vec<BillReminder>> {
    let txn = db.begin().await?;

    let reminders = pending_bill_reminders(&txn, today, lead_days).await?;
    if !reminders.is_empty() {
        let ids: Vec<i64> = reminders.iter().map(|r| r.bill_id).collect();
        Bill::update_many()
            .set(bill::ActiveModel {
                last_notified_on: Set(Some(today)),
                ..Default::default()
            })
            .filter(bill::Column::Id.is_in(ids))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(reminders)
}

/// Owners whose budget is below `threshold`.
pub async fn low_budget_alerts(db: &DatabaseConnection, threshold: f64) -> Result<Vec<LowBudgetAlert>> {
    let emails = owner_emails(db).await?;
    let budgets = super::budget::all_budgets(db).await?;

    Ok(budgets
        .into_iter()
        .filter(|b| b.initial_amount < threshold)
        .map(|b| LowBudgetAlert {
            owner_id: b.owner_id,
            email: emails.get(&b.owner_id).cloned().unwrap_or_default(),
            current_budget: b.initial_amount,
            threshold,
        })
        .collect())
}

/// Runs both checks for `today`.
pub async fn run_daily_checks(
    db: &DatabaseConnection,
    today: NaiveDate,
    settings: &LedgerSettings,
) -> Result<DailyCheckReport> {
    let reminders = send_bill_reminders(db, today, settings.reminder_lead_days).await?;
    let alerts = low_budget_alerts(db, settings.low_budget_threshold).await?;

    info!(
        %today,
        reminders = reminders.len(),
        alerts = alerts.len(),
        "Daily checks completed"
    );
    Ok(DailyCheckReport { reminders, alerts })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{bill as bills, budget as budgets};
    use crate::test_utils::*;

    fn bill_due(end_date: NaiveDate) -> bill::Model {
        bill::Model {
            id: 1,
            owner_id: 1,
            bill_name: "Rent".to_string(),
            amount: 900.0,
            category: "housing".to_string(),
            start_date: day(2024, 1, 1),
            end_date,
            is_paid: false,
            notify: true,
            last_notified_on: None,
        }
    }

    #[test]
    fn test_should_remind_lead_day_and_overdue() {
        let today = day(2024, 1, 20);
        assert!(should_remind(&bill_due(day(2024, 1, 22)), today, 2));
        assert!(should_remind(&bill_due(day(2024, 1, 19)), today, 2));
        assert!(!should_remind(&bill_due(day(2024, 1, 21)), today, 2));
        assert!(!should_remind(&bill_due(day(2024, 1, 20)), today, 2));
        assert!(!should_remind(&bill_due(day(2024, 1, 30)), today, 2));
    }

    #[test]
    fn test_should_remind_respects_flags() {
        let today = day(2024, 1, 20);

        let mut muted = bill_due(day(2024, 1, 19));
        muted.notify = false;
        assert!(!should_remind(&muted, today, 2));

        let mut paid = bill_due(day(2024, 1, 19));
        paid.is_paid = true;
        assert!(!should_remind(&paid, today, 2));

        let mut reminded = bill_due(day(2024, 1, 19));
        reminded.last_notified_on = Some(today);
        assert!(!should_remind(&reminded, today, 2));

        reminded.last_notified_on = Some(day(2024, 1, 19));
        assert!(should_remind(&reminded, today, 2));
    }

    #[tokio::test]
    async fn test_send_bill_reminders_once_per_day() -> Result<()> {
        let (db, owner) = setup_with_owner().await?;
        // new_bill is due 2024-01-31
        bills::add_bill(&db, owner.id, new_bill("Rent", 900.0)).await?;
        let mut muted = new_bill("Water", 40.0);
        muted.notify = false;
        bills::add_bill(&db, owner.id, muted).await?;

        let today = day(2024, 1, 29);
        let reminders = send_bill_reminders(&db, today, 2).await?;
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].bill_name, "Rent");
        assert_eq!(reminders[0].email, owner.email);
        assert_eq!(reminders[0].days_until_due, 2);
        assert!(!reminders[0].is_overdue());

        let stored = bills::require_bill(&db, owner.id, "Rent").await?;
        assert_eq!(stored.last_notified_on, Some(today));

        assert!(send_bill_reminders(&db, today, 2).await?.is_empty());

        // Overdue the following week
        let later = send_bill_reminders(&db, day(2024, 2, 5), 2).await?;
        assert_eq!(later.len(), 1);
        assert!(later[0].is_overdue());

        Ok(())
    }

    #[tokio::test]
    async fn test_low_budget_alerts() -> Result<()> {
        let (db, owner) = setup_with_owner().await?;
        let rich = create_test_owner(&db, "rich@example.com").await?;
        budgets::set_budget(&db, owner.id, 150.0).await?;
        budgets::set_budget(&db, rich.id, 5000.0).await?;

        let alerts = low_budget_alerts(&db, 200.0).await?;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].owner_id, owner.id);
        assert_eq!(alerts[0].current_budget, 150.0);
        assert_eq!(alerts[0].threshold, 200.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_budget_at_threshold_is_not_low() -> Result<()> {
        let (db, owner) = setup_with_owner().await?;
        budgets::set_budget(&db, owner.id, 200.0).await?;

        assert!(low_budget_alerts(&db, 200.0).await?.is_empty());

        budgets::set_budget(&db, owner.id, 199.0).await?;
        let alerts = low_budget_alerts(&db, 200.0).await?;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].current_budget, 199.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_run_daily_checks() -> Result<()> {
        let (db, owner) = setup_with_owner().await?;
        budgets::set_budget(&db, owner.id, 100.0).await?;
        bills::add_bill(&db, owner.id, new_bill("Rent", 900.0)).await?;

        let report = run_daily_checks(&db, day(2024, 1, 29), &LedgerSettings::default()).await?;
        assert_eq!(report.reminders.len(), 1);
        assert_eq!(report.alerts.len(), 1);

        Ok(())
    }
}
