//! Contribution entity - money a member put into the mess for one period.
//!
//! At most one row exists per `(mess_id, member_id, period)`. Settlement recompute
//! deletes and re-inserts all rows of its period.

use super::money::Money;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contribution database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "member_contributions")]
pub struct Model {
    /// Unique identifier for the contribution
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Mess the money went to
    pub mess_id: i64,
    /// Contributing user
    pub member_id: i64,
    /// Billing period, `YYYY-MM`
    pub period: String,
    /// Amount contributed, never negative
    #[sea_orm(column_type = "Text")]
    pub amount: Money,
    /// Free-text note (e.g., "fish market Friday")
    pub note: String,
    /// Manager who recorded the contribution
    pub added_by: i64,
    /// When the contribution was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Contribution and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each contribution belongs to one mess
    #[sea_orm(
        belongs_to = "super::mess::Entity",
        from = "Column::MessId",
        to = "super::mess::Column::Id",
        on_delete = "Cascade"
    )]
    Mess,
}

impl Related<super::mess::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mess.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
