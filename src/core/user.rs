//! User directory - registration and lookup of people who can join messes.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Registers a new user.
///
/// The name is trimmed and must not be empty. `chat_id` links the user to a chat
/// account so the bot can resolve who is calling.
pub async fn create_user(
    db: &DatabaseConnection,
    name: String,
    phone: Option<String>,
    chat_id: Option<String>,
) -> Result<user::Model> {
    if name.trim().is_empty() {
        return Err(Error::invalid_field("name", "must not be empty"));
    }

    let user = user::ActiveModel {
        name: Set(name.trim().to_string()),
        phone: Set(phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty())),
        chat_id: Set(chat_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = user.insert(db).await?;
    info!(user_id = created.id, "Registered user {}", created.name);
    Ok(created)
}

/// Resolves a user by ID, failing with `UserNotFound` when absent.
pub async fn resolve_user<C>(db: &C, user_id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { user_id })
}

/// Finds the user linked to a chat account, if any.
pub async fn find_user_by_chat_id(
    db: &DatabaseConnection,
    chat_id: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::ChatId.eq(chat_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads several users at once, ordered by ID. Unknown IDs are skipped.
pub async fn list_users_by_ids<C>(db: &C, user_ids: &[i64]) -> Result<Vec<user::Model>>
where
    C: ConnectionTrait,
{
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    User::find()
        .filter(user::Column::Id.is_in(user_ids.iter().copied()))
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
