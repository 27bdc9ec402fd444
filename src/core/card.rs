//! Credit card business logic - create, update, delete and list an owner's cards.
//!
//! Cards are addressed by `bank_name`, which is unique per owner. All amounts
//! are validated before anything is written.

use crate::{
    entities::{CreditCard, credit_card},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::info;

const ENTITY: &str = "Credit card";

/// Fields of a card to be created.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewCard {
    /// Issuing bank, unique per owner
    pub bank_name: String,
    /// Credit limit
    pub card_limit: f64,
    /// Amount currently owed
    pub current_balance: f64,
    /// First day of the payment window
    pub due_date_start: NaiveDate,
    /// Due date
    pub due_date_end: NaiveDate,
}

/// Partial update of a card; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CardUpdate {
    /// New credit limit
    pub card_limit: Option<f64>,
    /// New outstanding balance
    pub current_balance: Option<f64>,
    /// New start of the payment window
    pub due_date_start: Option<NaiveDate>,
    /// New due date
    pub due_date_end: Option<NaiveDate>,
}

fn validate_fields(
    card_limit: f64,
    current_balance: f64,
    due_date_start: NaiveDate,
    due_date_end: NaiveDate,
) -> Result<()> {
    super::ensure_non_negative(card_limit)?;
    super::ensure_non_negative(current_balance)?;
    if due_date_end < due_date_start {
        return Err(Error::validation(format!(
            "Due date {due_date_end} is before the window start {due_date_start}"
        )));
    }
    Ok(())
}

/// Finds a card by bank name for this owner.
pub async fn get_card<C>(db: &C, owner_id: i64, bank_name: &str) -> Result<Option<credit_card::Model>>
where
    C: ConnectionTrait,
{
    CreditCard::find()
        .filter(credit_card::Column::OwnerId.eq(owner_id))
        .filter(credit_card::Column::BankName.eq(bank_name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a card by bank name or fails with `NotFound`.
pub async fn require_card<C>(db: &C, owner_id: i64, bank_name: &str) -> Result<credit_card::Model>
where
    C: ConnectionTrait,
{
    get_card(db, owner_id, bank_name)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, bank_name.trim()))
}

/// Adds a card for the owner.
///
/// Fails with `DuplicateKey` if the owner already has a card from this bank.
pub async fn add_card(
    db: &DatabaseConnection,
    owner_id: i64,
    card: NewCard,
) -> Result<credit_card::Model> {
    let bank_name = super::normalize_name("Bank name", &card.bank_name)?;
    validate_fields(
        card.card_limit,
        card.current_balance,
        card.due_date_start,
        card.due_date_end,
    )?;

    let txn = db.begin().await?;

    if get_card(&txn, owner_id, &bank_name).await?.is_some() {
        return Err(Error::duplicate(ENTITY, bank_name));
    }

    let result = credit_card::ActiveModel {
        owner_id: Set(owner_id),
        bank_name: Set(bank_name),
        card_limit: Set(card.card_limit),
        current_balance: Set(card.current_balance),
        due_date_start: Set(card.due_date_start),
        due_date_end: Set(card.due_date_end),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(owner_id, bank_name = %result.bank_name, "Credit card added");
    Ok(result)
}

/// Applies a partial update to a card. Only provided fields change.
pub async fn update_card(
    db: &DatabaseConnection,
    owner_id: i64,
    bank_name: &str,
    update: CardUpdate,
) -> Result<credit_card::Model> {
    let txn = db.begin().await?;

    let card = require_card(&txn, owner_id, bank_name).await?;

    let card_limit = update.card_limit.unwrap_or(card.card_limit);
    let current_balance = update.current_balance.unwrap_or(card.current_balance);
    let due_date_start = update.due_date_start.unwrap_or(card.due_date_start);
    let due_date_end = update.due_date_end.unwrap_or(card.due_date_end);
    validate_fields(card_limit, current_balance, due_date_start, due_date_end)?;

    let mut active_model: credit_card::ActiveModel = card.into();
    active_model.card_limit = Set(card_limit);
    active_model.current_balance = Set(current_balance);
    active_model.due_date_start = Set(due_date_start);
    active_model.due_date_end = Set(due_date_end);
    let result = active_model.update(&txn).await?;

    txn.commit().await?;

    info!(owner_id, bank_name, "Credit card updated");
    Ok(result)
}

/// Deletes a card. Fails with `NotFound` if there is no such card.
pub async fn delete_card(db: &DatabaseConnection, owner_id: i64, bank_name: &str) -> Result<()> {
    let bank_name = bank_name.trim();
    let result = CreditCard::delete_many()
        .filter(credit_card::Column::OwnerId.eq(owner_id))
        .filter(credit_card::Column::BankName.eq(bank_name))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::not_found(ENTITY, bank_name));
    }

    info!(owner_id, bank_name, "Credit card deleted");
    Ok(())
}

/// All of the owner's cards, ordered by bank name.
pub async fn list_cards(db: &DatabaseConnection, owner_id: i64) -> Result<Vec<credit_card::Model>> {
    CreditCard::find()
        .filter(credit_card::Column::OwnerId.eq(owner_id))
        .order_by_asc(credit_card::Column::BankName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Cards with an outstanding balance.
pub async fn list_unpaid_cards(
    db: &DatabaseConnection,
    owner_id: i64,
) -> Result<Vec<credit_card::Model>> {
    CreditCard::find()
        .filter(credit_card::Column::OwnerId.eq(owner_id))
        .filter(credit_card::Column::CurrentBalance.gt(0.0))
        .order_by_asc(credit_card::Column::BankName)
        .all(db)
        .await
        .map_err(Into::into)
}
