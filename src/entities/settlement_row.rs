//! Settlement row entity - one member's share of a settlement.
//!
//! `balance` is `contributed_amount - total_cost`: positive means the member gets money
//! back, negative means the member still has to pay.

use super::money::Money;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Member settlement row database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "member_settlement_rows")]
pub struct Model {
    /// Unique identifier for the row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Settlement this row belongs to
    pub settlement_id: i64,
    /// Settled member
    pub member_id: i64,
    /// Meals the member ate in the period
    pub total_meals: i64,
    /// Cost attributed to the member (`total_meals * cost_per_meal`)
    #[sea_orm(column_type = "Text")]
    pub total_cost: Money,
    /// What the member contributed in the period
    #[sea_orm(column_type = "Text")]
    pub contributed_amount: Money,
    /// `contributed_amount - total_cost`
    #[sea_orm(column_type = "Text")]
    pub balance: Money,
}

/// Defines relationships between Settlement row and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each row belongs to one settlement
    #[sea_orm(
        belongs_to = "super::settlement::Entity",
        from = "Column::SettlementId",
        to = "super::settlement::Column::Id",
        on_delete = "Cascade"
    )]
    Settlement,
}

impl Related<super::settlement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Settlement.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
