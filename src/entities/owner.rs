//! Owner entity - The user account that every ledger record belongs to.
//!
//! Owners are looked up by their identity key (an email address). Nothing is
//! shared between owners.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Owner database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "owners")]
pub struct Model {
    /// Unique identifier for the owner
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identity key carried on every request
    #[sea_orm(unique)]
    pub email: String,
    /// Name shown to the user
    pub display_name: String,
    /// When the owner was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Owner and the ledger entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One owner has at most one budget
    #[sea_orm(has_one = "super::budget::Entity")]
    Budget,
    /// One owner has many credit cards
    #[sea_orm(has_many = "super::credit_card::Entity")]
    CreditCards,
    /// One owner has many bills
    #[sea_orm(has_many = "super::bill::Entity")]
    Bills,
    /// One owner has many spending entries
    #[sea_orm(has_many = "super::spending_entry::Entity")]
    SpendingEntries,
    /// One owner has many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
    /// One owner has many income events
    #[sea_orm(has_many = "super::income_event::Entity")]
    IncomeEvents,
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl Related<super::credit_card::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditCards.def()
    }
}

impl Related<super::bill::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bills.def()
    }
}

impl Related<super::spending_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SpendingEntries.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::income_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IncomeEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
