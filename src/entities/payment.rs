//! Payment entity - Historical record of a payment applied to a bill or card.
//!
//! `kind` is `"bill"` or `"card"`; `target_name` is the bill name or bank name
//! at the time of payment. Payments are append-only.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner who made the payment
    pub owner_id: i64,
    /// Type of target: `"bill"` or `"card"`
    pub kind: String,
    /// Name of the bill or bank the payment was applied to
    pub target_name: String,
    /// Amount submitted (including any discarded excess)
    pub amount: f64,
    /// When the payment was made
    pub timestamp: DateTimeUtc,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one owner
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
