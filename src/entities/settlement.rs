//! Settlement entity - the computed cost split of one mess for one period.
//!
//! `(mess_id, period)` is unique. A recompute deletes the header together with all its
//! rows and inserts fresh ones inside one transaction.

use super::money::Money;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Settlement header database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "monthly_settlements")]
pub struct Model {
    /// Unique identifier for the settlement
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Mess being settled
    pub mess_id: i64,
    /// Billing period, `YYYY-MM`
    pub period: String,
    /// Sum of contributions used as input
    #[sea_orm(column_type = "Text")]
    pub bazaar_cost: Money,
    /// Costs not covered by contributions (gas, cook, utilities)
    #[sea_orm(column_type = "Text")]
    pub extra_cost: Money,
    /// `bazaar_cost + extra_cost`
    #[sea_orm(column_type = "Text")]
    pub total_cost: Money,
    /// Sum of every member's meals in the period
    pub total_meals: i64,
    /// `total_cost / total_meals`, or zero when no meals were eaten
    #[sea_orm(column_type = "Text")]
    pub cost_per_meal: Money,
    /// Manager who ran the calculation
    pub calculated_by: i64,
    /// When the calculation ran
    pub calculated_at: DateTimeUtc,
}

/// Defines relationships between Settlement and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each settlement belongs to one mess
    #[sea_orm(
        belongs_to = "super::mess::Entity",
        from = "Column::MessId",
        to = "super::mess::Column::Id",
        on_delete = "Cascade"
    )]
    Mess,
    /// One settlement has one row per settled member
    #[sea_orm(has_many = "super::settlement_row::Entity")]
    Rows,
}

impl Related<super::mess::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mess.def()
    }
}

impl Related<super::settlement_row::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rows.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
