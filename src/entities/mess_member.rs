//! Membership entity - links a user to a mess.
//!
//! `(mess_id, user_id)` is unique. Managers are members with `is_manager` set; the owner's
//! membership row is created together with the mess and always has it set.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Membership database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "mess_members")]
pub struct Model {
    /// Unique identifier for the membership
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Mess the user belongs to
    pub mess_id: i64,
    /// Member user ID
    pub user_id: i64,
    /// Whether the member may record meals, contributions and settlements
    pub is_manager: bool,
    /// When the user joined
    pub joined_at: DateTimeUtc,
}

/// Defines relationships between Membership and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each membership belongs to one mess
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
