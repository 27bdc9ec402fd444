//! Spending log business logic.
//!
//! Entries are append-only facts in one of five fixed categories. The only way
//! to remove spending is to drop a whole category for an owner.

use crate::{
    entities::{SpendingEntry, spending_entry},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Fixed spending categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SpendingCategory {
    /// Clothes and shoes
    Clothing,
    /// Hobbies and leisure
    Hobby,
    /// Sport and fitness
    Sport,
    /// Courses, books, tuition
    Education,
    /// Everything else
    Other,
}

impl SpendingCategory {
    /// Every category, in display order.
    pub const ALL: [Self; 5] = [
        Self::Clothing,
        Self::Hobby,
        Self::Sport,
        Self::Education,
        Self::Other,
    ];

    /// Canonical name as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clothing => "Clothing",
            Self::Hobby => "Hobby",
            Self::Sport => "Sport",
            Self::Education => "Education",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for SpendingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpendingCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::validation(format!("Unknown spending category '{wanted}'")))
    }
}

/// Logs an expense now.
pub async fn log_spending(
    db: &DatabaseConnection,
    owner_id: i64,
    category: SpendingCategory,
    amount: f64,
) -> Result<spending_entry::Model> {
    log_spending_at(db, owner_id, category, amount, Utc::now()).await
}

/// Logs an expense with an explicit timestamp.
pub async fn log_spending_at(
    db: &DatabaseConnection,
    owner_id: i64,
    category: SpendingCategory,
    amount: f64,
    at: DateTime<Utc>,
) -> Result<spending_entry::Model> {
    super::ensure_non_negative(amount)?;

    let result = spending_entry::ActiveModel {
        owner_id: Set(owner_id),
        category: Set(category.as_str().to_string()),
        amount: Set(amount),
        timestamp: Set(at),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(owner_id, %category, amount, "Spending logged");
    Ok(result)
}

/// Deletes every entry of `category` for the owner and returns how many went.
///
/// Fails with `NotFound` when the owner has no spending in that category.
pub async fn delete_spending_category(
    db: &DatabaseConnection,
    owner_id: i64,
    category: SpendingCategory,
) -> Result<u64> {
    let result = SpendingEntry::delete_many()
        .filter(spending_entry::Column::OwnerId.eq(owner_id))
        .filter(spending_entry::Column::Category.eq(category.as_str()))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::not_found("Spending category", category.as_str()));
    }

    info!(owner_id, %category, deleted = result.rows_affected, "Spending category cleared");
    Ok(result.rows_affected)
}

/// Every spending entry of the owner, oldest first.
pub async fn list_spending(
    db: &DatabaseConnection,
    owner_id: i64,
) -> Result<Vec<spending_entry::Model>> {
    SpendingEntry::find()
        .filter(spending_entry::Column::OwnerId.eq(owner_id))
        .order_by_asc(spending_entry::Column::Timestamp)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Spending entries in `[start, end)`, oldest first.
pub async fn spending_between(
    db: &DatabaseConnection,
    owner_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<spending_entry::Model>> {
    SpendingEntry::find()
        .filter(spending_entry::Column::OwnerId.eq(owner_id))
        .filter(spending_entry::Column::Timestamp.gte(start))
        .filter(spending_entry::Column::Timestamp.lt(end))
        .order_by_asc(spending_entry::Column::Timestamp)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The `limit` most recent entries, newest first.
pub async fn recent_spending(
    db: &DatabaseConnection,
    owner_id: i64,
    limit: u64,
) -> Result<Vec<spending_entry::Model>> {
    SpendingEntry::find()
        .filter(spending_entry::Column::OwnerId.eq(owner_id))
        .order_by_desc(spending_entry::Column::Timestamp)
        .order_by_desc(spending_entry::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sum of everything the owner has logged.
pub async fn total_spending(db: &DatabaseConnection, owner_id: i64) -> Result<f64> {
    let entries = list_spending(db, owner_id).await?;
    Ok(entries.iter().map(|entry| entry.amount).sum())
}
