//! Bill entity - A named bill with an outstanding amount and a billing period.
//!
//! `bill_name` is unique per owner. Once `is_paid` is set the bill is closed;
//! the next cycle is a new bill.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Bill database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bills")]
pub struct Model {
    /// Unique identifier for the bill
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner this bill belongs to
    pub owner_id: i64,
    /// Name of the bill, unique per owner
    pub bill_name: String,
    /// Outstanding amount
    pub amount: f64,
    /// Free-form category (e.g. "utilities")
    pub category: String,
    /// Start of the billing period
    pub start_date: Date,
    /// End of the billing period (the due date)
    pub end_date: Date,
    /// Whether the bill has been paid off
    pub is_paid: bool,
    /// Whether due-date reminders are sent for this bill
    pub notify: bool,
    /// Day the last reminder was produced
    pub last_notified_on: Option<Date>,
}

impl Model {
    /// Whether there is still something to pay on this bill.
    #[must_use]
    pub fn is_outstanding(&self) -> bool {
        !self.is_paid && self.amount > 0.0
    }
}

/// Defines relationships between Bill and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each bill belongs to one owner
    #[sea_orm(
        belongs_to = "super::owner::Entity",
        from = "Column::OwnerId",
        to = "super::owner::Column::Id"
    )]
    Owner,
}

impl Related<super::owner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
