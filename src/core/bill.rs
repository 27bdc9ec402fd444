//! Bill business logic - create, update, delete and list an owner's bills.
//!
//! Bills are addressed by `bill_name`, which is unique per owner.

use crate::{
    entities::{Bill, bill},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::info;

const ENTITY: &str = "Bill";

/// Fields of a bill to be created.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewBill {
    /// Name of the bill, unique per owner
    pub bill_name: String,
    /// Amount due
    pub amount: f64,
    /// Free-form category
    pub category: String,
    /// Start of the billing period
    pub start_date: NaiveDate,
    /// Due date
    pub end_date: NaiveDate,
    /// Whether the bill is already paid
    #[serde(default)]
    pub is_paid: bool,
    /// Whether reminders are wanted
    #[serde(default = "default_notify")]
    pub notify: bool,
}

const fn default_notify() -> bool {
    true
}

/// Partial update of a bill; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BillUpdate {
    /// New amount due
    pub amount: Option<f64>,
    /// New category
    pub category: Option<String>,
    /// New start of the billing period
    pub start_date: Option<NaiveDate>,
    /// New due date
    pub end_date: Option<NaiveDate>,
    /// New paid flag
    pub is_paid: Option<bool>,
    /// New reminder preference
    pub notify: Option<bool>,
}

fn validate_fields(amount: f64, start_date: NaiveDate, end_date: NaiveDate) -> Result<()> {
    super::ensure_non_negative(amount)?;
    if end_date < start_date {
        return Err(Error::validation(format!(
            "End date {end_date} is before start date {start_date}"
        )));
    }
    Ok(())
}

/// Finds a bill by name for this owner.
pub async fn get_bill<C>(db: &C, owner_id: i64, bill_name: &str) -> Result<Option<bill::Model>>
where
    C: ConnectionTrait,
{
    Bill::find()
        .filter(bill::Column::OwnerId.eq(owner_id))
        .filter(bill::Column::BillName.eq(bill_name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a bill by name or fails with `NotFound`.
pub async fn require_bill<C>(db: &C, owner_id: i64, bill_name: &str) -> Result<bill::Model>
where
    C: ConnectionTrait,
{
    get_bill(db, owner_id, bill_name)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, bill_name.trim()))
}

/// Adds a bill for the owner.
///
/// Fails with `DuplicateKey` if the owner already has a bill with this name.
pub async fn add_bill(db: &DatabaseConnection, owner_id: i64, new: NewBill) -> Result<bill::Model> {
    let bill_name = super::normalize_name("Bill name", &new.bill_name)?;
    validate_fields(new.amount, new.start_date, new.end_date)?;

    let txn = db.begin().await?;

    if get_bill(&txn, owner_id, &bill_name).await?.is_some() {
        return Err(Error::duplicate(ENTITY, bill_name));
    }

    let result = bill::ActiveModel {
        owner_id: Set(owner_id),
        bill_name: Set(bill_name),
        amount: Set(new.amount),
        category: Set(new.category.trim().to_string()),
        start_date: Set(new.start_date),
        end_date: Set(new.end_date),
        is_paid: Set(new.is_paid),
        notify: Set(new.notify),
        last_notified_on: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(owner_id, bill_name = %result.bill_name, "Bill added");
    Ok(result)
}

/// Applies a partial update to a bill. Only provided fields change.
///
/// A paid bill keeps its amount and stays paid; only its category, dates and
/// reminder preference can still be edited.
pub async fn update_bill(
    db: &DatabaseConnection,
    owner_id: i64,
    bill_name: &str,
    update: BillUpdate,
) -> Result<bill::Model> {
    let txn = db.begin().await?;

    let bill = require_bill(&txn, owner_id, bill_name).await?;

    if bill.is_paid {
        let reopens = update.is_paid == Some(false);
        let changes_amount = update
            .amount
            .is_some_and(|amount| (amount - bill.amount).abs() > f64::EPSILON);
        if reopens || changes_amount {
            return Err(Error::validation(format!(
                "Bill '{}' is paid and cannot be reopened",
                bill.bill_name
            )));
        }
    }

    let amount = update.amount.unwrap_or(bill.amount);
    let start_date = update.start_date.unwrap_or(bill.start_date);
    let end_date = update.end_date.unwrap_or(bill.end_date);
    validate_fields(amount, start_date, end_date)?;

    let mut active_model: bill::ActiveModel = bill.into();
    active_model.amount = Set(amount);
    active_model.start_date = Set(start_date);
    active_model.end_date = Set(end_date);
    if let Some(category) = update.category {
        active_model.category = Set(category.trim().to_string());
    }
    if let Some(is_paid) = update.is_paid {
        active_model.is_paid = Set(is_paid);
    }
    if let Some(notify) = update.notify {
        active_model.notify = Set(notify);
    }
    let result = active_model.update(&txn).await?;

    txn.commit().await?;

    info!(owner_id, bill_name, "Bill updated");
    Ok(result)
}

/// Deletes a bill. Fails with `NotFound` if there is no such bill.
pub async fn delete_bill(db: &DatabaseConnection, owner_id: i64, bill_name: &str) -> Result<()> {
    let bill_name = bill_name.trim();
    let result = Bill::delete_many()
        .filter(bill::Column::OwnerId.eq(owner_id))
        .filter(bill::Column::BillName.eq(bill_name))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::not_found(ENTITY, bill_name));
    }

    info!(owner_id, bill_name, "Bill deleted");
    Ok(())
}

/// All of the owner's bills, ordered by due date.
pub async fn list_bills(db: &DatabaseConnection, owner_id: i64) -> Result<Vec<bill::Model>> {
    Bill::find()
        .filter(bill::Column::OwnerId.eq(owner_id))
        .order_by_asc(bill::Column::EndDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Bills that are not paid and still have an amount due.
pub async fn list_unpaid_bills(db: &DatabaseConnection, owner_id: i64) -> Result<Vec<bill::Model>> {
    Bill::find()
        .filter(bill::Column::OwnerId.eq(owner_id))
        .filter(bill::Column::IsPaid.eq(false))
        .filter(bill::Column::Amount.gt(0.0))
        .order_by_asc(bill::Column::EndDate)
        .all(db)
        .await
        .map_err(Into::into)
}
