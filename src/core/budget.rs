//! Budget business logic - the owner's cash budget and income history.
//!
//! Setting the budget replaces the stored amount and appends an income event.
//! Spending never decrements the budget; [`budget_status`] derives what is
//! left by subtracting the spending log.

use crate::{
    entities::{Budget, IncomeEvent, budget, income_event},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::info;

/// Initial budget and what is left of it after logged spending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    /// Amount the owner set as income (0 when no budget exists)
    pub initial_budget: f64,
    /// Initial budget minus total logged spending
    pub remaining_amount: f64,
}

/// Checks that a budget amount is a positive whole number.
pub fn validate_budget_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 || amount.fract() != 0.0 {
        return Err(Error::validation(format!(
            "Budget must be a positive whole number, got {amount}"
        )));
    }
    Ok(())
}

/// Sets the owner's budget to `amount`, creating it if needed.
pub async fn set_budget(
    db: &DatabaseConnection,
    owner_id: i64,
    amount: f64,
) -> Result<budget::Model> {
    set_budget_at(db, owner_id, amount, Utc::now()).await
}

/// Sets the owner's budget, recording the income event at `at`.
///
/// Repeating the call with the same amount leaves the budget unchanged apart
/// from the timestamp; each call still records an income event.
pub async fn set_budget_at(
    db: &DatabaseConnection,
    owner_id: i64,
    amount: f64,
    at: DateTime<Utc>,
) -> Result<budget::Model> {
    validate_budget_amount(amount)?;

    let txn = db.begin().await?;

    let existing = Budget::find()
        .filter(budget::Column::OwnerId.eq(owner_id))
        .one(&txn)
        .await?;

    let result = if let Some(existing) = existing {
        let mut active_model: budget::ActiveModel = existing.into();
        active_model.initial_amount = Set(amount);
        active_model.updated_at = Set(at);
        active_model.update(&txn).await?
    } else {
        budget::ActiveModel {
            owner_id: Set(owner_id),
            initial_amount: Set(amount),
            updated_at: Set(at),
            ..Default::default()
        }
        .insert(&txn)
        .await?
    };

    income_event::ActiveModel {
        owner_id: Set(owner_id),
        amount: Set(amount),
        timestamp: Set(at),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(owner_id, amount, "Budget set");
    Ok(result)
}

/// Retrieves the owner's budget, if one was set.
pub async fn get_budget<C>(db: &C, owner_id: i64) -> Result<Option<budget::Model>>
where
    C: ConnectionTrait,
{
    Budget::find()
        .filter(budget::Column::OwnerId.eq(owner_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the owner's budget or fails with `NotFound`.
pub async fn require_budget<C>(db: &C, owner_id: i64) -> Result<budget::Model>
where
    C: ConnectionTrait,
{
    get_budget(db, owner_id)
        .await?
        .ok_or_else(|| Error::not_found("Budget", owner_id.to_string()))
}

/// Reports the initial budget and what remains after logged spending.
pub async fn budget_status(db: &DatabaseConnection, owner_id: i64) -> Result<BudgetStatus> {
    let Some(budget) = get_budget(db, owner_id).await? else {
        return Ok(BudgetStatus {
            initial_budget: 0.0,
            remaining_amount: 0.0,
        });
    };

    let spent = super::spending::total_spending(db, owner_id).await?;
    Ok(BudgetStatus {
        initial_budget: budget.initial_amount,
        remaining_amount: budget.initial_amount - spent,
    })
}

/// Income events recorded in `[start, end)`, oldest first.
pub async fn income_events_between(
    db: &DatabaseConnection,
    owner_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<income_event::Model>> {
    IncomeEvent::find()
        .filter(income_event::Column::OwnerId.eq(owner_id))
        .filter(income_event::Column::Timestamp.gte(start))
        .filter(income_event::Column::Timestamp.lt(end))
        .order_by_asc(income_event::Column::Timestamp)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every budget in the ledger, across owners.
pub async fn all_budgets(db: &DatabaseConnection) -> Result<Vec<budget::Model>> {
    Budget::find()
        .order_by_asc(budget::Column::OwnerId)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::spending::{self, SpendingCategory};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_validate_budget_amount() {
        assert!(validate_budget_amount(1000.0).is_ok());
        assert!(validate_budget_amount(1.0).is_ok());
        assert!(validate_budget_amount(0.0).is_err());
        assert!(validate_budget_amount(-5.0).is_err());
        assert!(validate_budget_amount(10.5).is_err());
        assert!(validate_budget_amount(f64::NAN).is_err());
        assert!(validate_budget_amount(f64::INFINITY).is_err());
    }

    #[tokio::test]
    async fn test_set_budget_validation_happens_before_storage() {
        // No query results are configured, so any storage access would fail.
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = set_budget(&db, 1, 99.5).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[tokio::test]
    async fn test_set_budget_creates_then_replaces() -> Result<()> {
        let (db, owner) = setup_with_owner().await?;

        let first = set_budget(&db, owner.id, 1000.0).await?;
        assert_eq!(first.initial_amount, 1000.0);

        let second = set_budget(&db, owner.id, 1500.0).await?;
        assert_eq!(second.id, first.id);
        assert_eq!(second.initial_amount, 1500.0);

        let stored = require_budget(&db, owner.id).await?;
        assert_eq!(stored.initial_amount, 1500.0);
        assert_eq!(all_budgets(&db).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_budget_is_idempotent_for_same_amount() -> Result<()> {
        let (db, owner) = setup_with_owner().await?;

        set_budget(&db, owner.id, 1000.0).await?;
        set_budget(&db, owner.id, 1000.0).await?;

        assert_eq!(require_budget(&db, owner.id).await?.initial_amount, 1000.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_budget_records_income_events() -> Result<()> {
        let (db, owner) = setup_with_owner().await?;

        set_budget_at(&db, owner.id, 1000.0, at(2024, 3, 1)).await?;
        set_budget_at(&db, owner.id, 1200.0, at(2024, 4, 1)).await?;

        let (start, end) = crate::core::period::year_bounds(2024)?;
        let events = income_events_between(&db, owner.id, start, end).await?;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].amount, 1000.0);
        assert_eq!(events[1].amount, 1200.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_require_budget_missing() -> Result<()> {
        let (db, owner) = setup_with_owner().await?;
        let result = require_budget(&db, owner.id).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_budget_status_subtracts_spending() -> Result<()> {
        let (db, owner) = setup_with_owner().await?;

        let empty = budget_status(&db, owner.id).await?;
        assert_eq!(empty.initial_budget, 0.0);
        assert_eq!(empty.remaining_amount, 0.0);

        set_budget(&db, owner.id, 1000.0).await?;
        spending::log_spending(&db, owner.id, SpendingCategory::Hobby, 150.0).await?;
        spending::log_spending(&db, owner.id, SpendingCategory::Sport, 50.0).await?;

        let status = budget_status(&db, owner.id).await?;
        assert_eq!(status.initial_budget, 1000.0);
        assert_eq!(status.remaining_amount, 800.0);

        // The stored budget itself is never decremented
        assert_eq!(require_budget(&db, owner.id).await?.initial_amount, 1000.0);

        Ok(())
    }
}
