//! Core business logic - framework-agnostic ledger, allocation and reporting operations.
//!
//! Every function takes the owner id explicitly; nothing here reads ambient
//! session state. Mutations run inside a database transaction so a failed
//! operation leaves the ledger unchanged.

/// Bills: create, update, delete, list
pub mod bill;
/// Cash budget and income events
pub mod budget;
/// Credit cards: create, update, delete, list
pub mod card;
/// Home-page advice derived from this month's spending
pub mod insights;
/// Per-owner serialization of mutations
pub mod locks;
/// Owner registry and identity resolution
pub mod owner;
/// Payment allocation against bills and cards
pub mod payment;
/// Calendar ranges used by the reports
pub mod period;
/// Bill reminders and low-budget alerts
pub mod reminder;
/// Aggregated figures: headroom, resources, summaries, monthly balance
pub mod report;
/// Spending log
pub mod spending;

use crate::errors::{Error, Result};

/// Rejects amounts that are negative or not finite.
pub(crate) fn ensure_non_negative(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

/// Trims a key and rejects it when empty.
pub(crate) fn normalize_name(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}
