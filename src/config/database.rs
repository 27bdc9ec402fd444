//! Database configuration module for the budget ledger.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust models.

use crate::entities::{
    Bill, BillColumn, Budget, CreditCard, CreditCardColumn, IncomeEvent, Owner, Payment,
    SpendingEntry,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema, sea_query::Index};
use std::path::Path;
use tracing::debug;

/// Default database location when neither `DATABASE_URL` nor config.toml sets one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/budget_ledger.sqlite?mode=rwc";

/// Creates the directory holding a file-backed `SQLite` database, if needed.
///
/// In-memory URLs and URLs for other backends are left alone.
pub fn ensure_parent_dir(database_url: &str) -> Result<()> {
    let Some(rest) = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
    else {
        return Ok(());
    };
    let file = rest.split('?').next().unwrap_or_default();
    if file.is_empty() || file.contains(":memory:") {
        return Ok(());
    }
    if let Some(parent) = Path::new(file).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Establishes a connection to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!(database_url, "Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all ledger tables that do not exist yet.
///
/// Owners are created first since every other table references them. Also
/// creates the per-owner unique indexes on card and bill names.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statements = vec![
        schema.create_table_from_entity(Owner),
        schema.create_table_from_entity(Budget),
        schema.create_table_from_entity(IncomeEvent),
        schema.create_table_from_entity(CreditCard),
        schema.create_table_from_entity(Bill),
        schema.create_table_from_entity(SpendingEntry),
        schema.create_table_from_entity(Payment),
    ];

    for statement in &mut statements {
        statement.if_not_exists();
        db.execute(builder.build(&*statement)).await?;
    }

    // Card and bill names are unique per owner
    let indexes = [
        Index::create()
            .name("idx_credit_cards_owner_bank_name")
            .table(CreditCard)
            .col(CreditCardColumn::OwnerId)
            .col(CreditCardColumn::BankName)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_bills_owner_bill_name")
            .table(Bill)
            .col(BillColumn::OwnerId)
            .col(BillColumn::BillName)
            .unique()
            .if_not_exists()
            .to_owned(),
    ];
    for index in &indexes {
        db.execute(builder.build(index)).await?;
    }

    Ok(())
}
