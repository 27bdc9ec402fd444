//! Income event entity - One record per "set income" action.
//!
//! These feed the income column of the monthly balance report.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Income event database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "income_events")]
pub struct Model {
    /// Unique identifier for the event
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner the income belongs to
    pub owner_id: i64,
    /// Amount the budget was set to
    pub amount: f64,
    /// When the budget was set
    pub timestamp: DateTimeUtc,
}

/// Defines relationships between `IncomeEvent` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each income event belongs to one owner
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
