//! User entity - a person who can belong to one or more messes.
//!
//! Users are linked to their chat account through `chat_id` so that commands can
//! resolve the acting user explicitly.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Optional phone number, unique when present
    #[sea_orm(unique)]
    pub phone: Option<String>,
    /// Discord user ID of the linked chat account, unique when present
    #[sea_orm(unique)]
    pub chat_id: Option<String>,
    /// When the user was registered
    pub created_at: DateTimeUtc,
}

/// Users are referenced by id from other tables without declared relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
