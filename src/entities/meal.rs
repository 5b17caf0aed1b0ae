//! Meal entity - how many meals a member had on one day.
//!
//! At most one row exists per `(mess_id, member_id, date)`; re-recording a day replaces
//! the count. `meal_count` is always one of 0, 1, 2 or 3.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Meal entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meals")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Mess the meal was eaten in
    pub mess_id: i64,
    /// User who ate
    pub member_id: i64,
    /// Calendar day
    pub date: Date,
    /// Number of meals that day (0-3)
    pub meal_count: i32,
    /// Manager who recorded the entry
    pub added_by: i64,
    /// When the entry was first recorded
    pub created_at: DateTimeUtc,
    /// When the count was last replaced
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Meal and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each meal entry belongs to one mess
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
