//! Mess (group) membership - creation, membership administration and role checks.
//!
//! The owner of a mess is always a member and a manager: [`create_group`] inserts the
//! owner's membership in the same transaction as the mess itself. Operations that need a
//! role take an access token ([`MemberAccess`] / [`ManagerAccess`]) which can only be
//! obtained through [`authorize_member`] / [`authorize_manager`], so a ledger or
//! settlement call is always pre-authorized and always knows who is acting.

use crate::{
    entities::{Mess, MessMember, mess, mess_member},
    errors::{Error, Result, Role},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Proof that `user_id` is a member of `group_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberAccess {
    group_id: i64,
    user_id: i64,
}

impl MemberAccess {
    /// Mess the access applies to
    #[must_use]
    pub const fn group_id(&self) -> i64 {
        self.group_id
    }

    /// Acting user
    #[must_use]
    pub const fn user_id(&self) -> i64 {
        self.user_id
    }
}

/// Proof that `user_id` is a manager of `group_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerAccess {
    group_id: i64,
    user_id: i64,
}

impl ManagerAccess {
    /// Mess the access applies to
    #[must_use]
    pub const fn group_id(&self) -> i64 {
        self.group_id
    }

    /// Acting user, recorded as `added_by` / `calculated_by`
    #[must_use]
    pub const fn user_id(&self) -> i64 {
        self.user_id
    }

    #[cfg(test)]
    pub(crate) const fn for_tests(group_id: i64, user_id: i64) -> Self {
        Self { group_id, user_id }
    }

    /// Managers can do everything members can.
    #[must_use]
    pub const fn as_member(&self) -> MemberAccess {
        MemberAccess {
            group_id: self.group_id,
            user_id: self.user_id,
        }
    }
}

/// Creates a mess owned by `owner_id`, adding the owner as member and manager.
pub async fn create_group(
    db: &DatabaseConnection,
    owner_id: i64,
    name: String,
    description: String,
) -> Result<mess::Model> {
    if name.trim().is_empty() {
        return Err(Error::invalid_field("name", "must not be empty"));
    }

    let txn = db.begin().await?;
    crate::core::user::resolve_user(&txn, owner_id).await?;

    let now = chrono::Utc::now();
    let group = mess::ActiveModel {
        name: Set(name.trim().to_string()),
        description: Set(description.trim().to_string()),
        owner_id: Set(owner_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    mess_member::ActiveModel {
        mess_id: Set(group.id),
        user_id: Set(owner_id),
        is_manager: Set(true),
        joined_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(group_id = group.id, owner_id, "Created mess {}", group.name);
    Ok(group)
}

/// Loads a mess, failing with `GroupNotFound` when absent.
pub async fn get_group<C>(db: &C, group_id: i64) -> Result<mess::Model>
where
    C: ConnectionTrait,
{
    Mess::find_by_id(group_id)
        .one(db)
        .await?
        .ok_or(Error::GroupNotFound { group_id })
}

async fn find_membership<C>(
    db: &C,
    group_id: i64,
    user_id: i64,
) -> Result<Option<mess_member::Model>>
where
    C: ConnectionTrait,
{
    MessMember::find()
        .filter(mess_member::Column::MessId.eq(group_id))
        .filter(mess_member::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// True when the user belongs to the mess.
pub async fn is_member<C>(db: &C, group_id: i64, user_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(find_membership(db, group_id, user_id).await?.is_some())
}

/// True when the user manages the mess.
pub async fn is_manager<C>(db: &C, group_id: i64, user_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(find_membership(db, group_id, user_id)
        .await?
        .is_some_and(|m| m.is_manager))
}

/// True when the user owns the mess.
pub async fn is_owner<C>(db: &C, group_id: i64, user_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(get_group(db, group_id).await?.owner_id == user_id)
}

/// Checks that the mess exists and `user_id` is a member of it.
pub async fn authorize_member(
    db: &DatabaseConnection,
    group_id: i64,
    user_id: i64,
) -> Result<MemberAccess> {
    get_group(db, group_id).await?;
    if !is_member(db, group_id, user_id).await? {
        return Err(Error::NotAuthorized {
            group_id,
            user_id,
            required: Role::Member,
        });
    }
    Ok(MemberAccess { group_id, user_id })
}

/// Checks that the mess exists and `user_id` is a manager of it.
pub async fn authorize_manager(
    db: &DatabaseConnection,
    group_id: i64,
    user_id: i64,
) -> Result<ManagerAccess> {
    get_group(db, group_id).await?;
    if !is_manager(db, group_id, user_id).await? {
        return Err(Error::NotAuthorized {
            group_id,
            user_id,
            required: Role::Manager,
        });
    }
    Ok(ManagerAccess { group_id, user_id })
}

/// Adds an existing user to the mess. Only managers may add members.
pub async fn add_member(
    db: &DatabaseConnection,
    access: &ManagerAccess,
    user_id: i64,
) -> Result<mess_member::Model> {
    let group_id = access.group_id();
    crate::core::user::resolve_user(db, user_id).await?;
    if is_member(db, group_id, user_id).await? {
        return Err(Error::AlreadyMember { group_id, user_id });
    }

    let membership = mess_member::ActiveModel {
        mess_id: Set(group_id),
        user_id: Set(user_id),
        is_manager: Set(false),
        joined_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(group_id, user_id, added_by = access.user_id(), "Added member");
    Ok(membership)
}

/// Promotes a member to manager. Only the owner may do this, and the user must
/// already be a member.
pub async fn add_manager(
    db: &DatabaseConnection,
    group_id: i64,
    actor_id: i64,
    user_id: i64,
) -> Result<mess_member::Model> {
    if !is_owner(db, group_id, actor_id).await? {
        return Err(Error::NotAuthorized {
            group_id,
            user_id: actor_id,
            required: Role::Owner,
        });
    }
    crate::core::user::resolve_user(db, user_id).await?;

    let membership = find_membership(db, group_id, user_id)
        .await?
        .ok_or(Error::NotAMember { group_id, user_id })?;
    if membership.is_manager {
        return Ok(membership);
    }

    let mut active_model: mess_member::ActiveModel = membership.into();
    active_model.is_manager = Set(true);
    let updated = active_model.update(db).await?;

    info!(group_id, user_id, "Promoted member to manager");
    Ok(updated)
}

/// Lists the memberships of a mess ordered by user ID.
pub async fn list_members(
    db: &DatabaseConnection,
    access: &MemberAccess,
) -> Result<Vec<mess_member::Model>> {
    MessMember::find()
        .filter(mess_member::Column::MessId.eq(access.group_id()))
        .order_by_asc(mess_member::Column::UserId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the messes a user belongs to, ordered by mess ID.
pub async fn groups_for_user(db: &DatabaseConnection, user_id: i64) -> Result<Vec<mess::Model>> {
    let group_ids: Vec<i64> = MessMember::find()
        .filter(mess_member::Column::UserId.eq(user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.mess_id)
        .collect();

    if group_ids.is_empty() {
        return Ok(Vec::new());
    }

    Mess::find()
        .filter(mess::Column::Id.is_in(group_ids))
        .order_by_asc(mess::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
