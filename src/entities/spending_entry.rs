//! Spending entry entity - One logged expense in a fixed category.
//!
//! `category` holds the canonical name of a
//! [`SpendingCategory`](crate::core::spending::SpendingCategory).
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Spending entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "spending_entries")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner who logged the expense
    pub owner_id: i64,
    /// Spending category name
    pub category: String,
    /// Amount spent
    pub amount: f64,
    /// When the expense was logged
    pub timestamp: DateTimeUtc,
}

/// Defines relationships between `SpendingEntry` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one owner
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
