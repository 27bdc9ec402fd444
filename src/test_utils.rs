//! Shared test utilities for the budget ledger.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{bill::NewBill, card::NewCard, owner},
    entities,
    errors::Result,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Registers a test owner under `email`.
pub async fn create_test_owner(
    db: &DatabaseConnection,
    email: &str,
) -> Result<entities::owner::Model> {
    owner::register_owner(db, email, "Test Owner").await
}

/// Sets up a database with one owner, `test@example.com`.
pub async fn setup_with_owner() -> Result<(DatabaseConnection, entities::owner::Model)> {
    let db = setup_test_db().await?;
    let owner = create_test_owner(&db, "test@example.com").await?;
    Ok((db, owner))
}

/// A calendar date. Panics on an invalid date, which is a bug in the test.
#[allow(clippy::unwrap_used)]
pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Noon UTC on the given date.
#[allow(clippy::unwrap_used)]
pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

/// A card due between 2024-01-01 and 2024-01-25.
pub fn new_card(bank_name: &str, card_limit: f64, current_balance: f64) -> NewCard {
    NewCard {
        bank_name: bank_name.to_string(),
        card_limit,
        current_balance,
        due_date_start: day(2024, 1, 1),
        due_date_end: day(2024, 1, 25),
    }
}

/// An unpaid "utilities" bill for January 2024 with reminders enabled.
pub fn new_bill(bill_name: &str, amount: f64) -> NewBill {
    NewBill {
        bill_name: bill_name.to_string(),
        amount,
        category: "utilities".to_string(),
        start_date: day(2024, 1, 1),
        end_date: day(2024, 1, 31),
        is_paid: false,
        notify: true,
    }
}
