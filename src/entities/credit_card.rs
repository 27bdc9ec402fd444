//! Credit card entity - A card with a limit, an outstanding balance, and a due window.
//!
//! `bank_name` is unique per owner and is the key cards are addressed by.
//! A balance above the limit is tolerated; headroom is floored at zero.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Credit card database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "credit_cards")]
pub struct Model {
    /// Unique identifier for the card
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner this card belongs to
    pub owner_id: i64,
    /// Issuing bank, unique per owner
    pub bank_name: String,
    /// Credit limit
    pub card_limit: f64,
    /// Amount currently owed
    pub current_balance: f64,
    /// First day of the payment window
    pub due_date_start: Date,
    /// Last day of the payment window (the due date)
    pub due_date_end: Date,
}

impl Model {
    /// Unused credit on this card, never negative.
    #[must_use]
    pub fn headroom(&self) -> f64 {
        (self.card_limit - self.current_balance).max(0.0)
    }
}

/// Defines relationships between `CreditCard` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each card belongs to one owner
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
