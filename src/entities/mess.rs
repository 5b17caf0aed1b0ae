//! Mess entity - a shared household with one owner, managers and members.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Mess database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "messes")]
pub struct Model {
    /// Unique identifier for the mess
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name (e.g., "Dhanmondi Flat 4B")
    pub name: String,
    /// Free-text description
    pub description: String,
    /// User who created the mess
    pub owner_id: i64,
    /// When the mess was created
    pub created_at: DateTimeUtc,
    /// When the mess was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Mess and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One mess has many memberships
    #[sea_orm(has_many = "super::mess_member::Entity")]
    Members,
    /// One mess has many meal entries
    #[sea_orm(has_many = "super::meal::Entity")]
    Meals,
    /// One mess has many contributions
    #[sea_orm(has_many = "super::contribution::Entity")]
    Contributions,
    /// One mess has many settlements, one per period
    #[sea_orm(has_many = "super::settlement::Entity")]
    Settlements,
}

impl Related<super::mess_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::meal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meals.def()
    }
}

impl Related<super::contribution::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contributions.def()
    }
}

impl Related<super::settlement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Settlements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
