//! Contribution ledger - money each member put in for a period.
//!
//! Contributions are upserted by `(mess, member, period)`. Settlement recompute replaces
//! a whole period at once through [`replace_contributions_for_period`], which runs inside
//! the settlement transaction.

use crate::{
    core::{
        group::{self, ManagerAccess, MemberAccess},
        period::Period,
    },
    entities::{Contribution, contribution},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::BTreeMap;
use tracing::debug;

/// A contribution as supplied by a manager, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionInput {
    /// Contributing member
    pub member_id: i64,
    /// Amount contributed
    pub amount: Decimal,
    /// Free-text note
    pub note: String,
}

impl ContributionInput {
    /// Builds an input without a note.
    #[must_use]
    pub const fn new(member_id: i64, amount: Decimal) -> Self {
        Self {
            member_id,
            amount,
            note: String::new(),
        }
    }
}

/// Records (or replaces) a member's contribution for a period.
///
/// Fails with `InvalidAmount` for negative amounts, a validation error for sub-cent
/// amounts and `NotAMember` when the member does not belong to the mess.
pub async fn record_contribution(
    db: &DatabaseConnection,
    access: &ManagerAccess,
    member_id: i64,
    period: Period,
    amount: Decimal,
    note: String,
) -> Result<contribution::Model> {
    if amount < Decimal::ZERO {
        return Err(Error::InvalidAmount { amount });
    }
    if amount.normalize().scale() > 2 {
        return Err(Error::invalid_field(
            "amount",
            "must have at most 2 decimal places",
        ));
    }

    let group_id = access.group_id();
    if !group::is_member(db, group_id, member_id).await? {
        return Err(Error::NotAMember {
            group_id,
            user_id: member_id,
        });
    }

    let existing = Contribution::find()
        .filter(contribution::Column::MessId.eq(group_id))
        .filter(contribution::Column::MemberId.eq(member_id))
        .filter(contribution::Column::Period.eq(period.to_string()))
        .one(db)
        .await?;

    let saved = if let Some(entry) = existing {
        let mut active_model: contribution::ActiveModel = entry.into();
        active_model.amount = Set(amount.into());
        active_model.note = Set(note);
        active_model.added_by = Set(access.user_id());
        active_model.update(db).await?
    } else {
        contribution::ActiveModel {
            mess_id: Set(group_id),
            member_id: Set(member_id),
            period: Set(period.to_string()),
            amount: Set(amount.into()),
            note: Set(note),
            added_by: Set(access.user_id()),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?
    };

    debug!(group_id, member_id, %period, %amount, "Recorded contribution");
    Ok(saved)
}

/// Deletes every contribution of `(group_id, period)` and inserts `entries` instead.
///
/// Must run on the caller's transaction; entries are assumed validated.
pub(crate) async fn replace_contributions_for_period<C>(
    db: &C,
    group_id: i64,
    period: Period,
    entries: &[ContributionInput],
    recorded_by: i64,
) -> Result<Vec<contribution::Model>>
where
    C: ConnectionTrait,
{
    let removed = Contribution::delete_many()
        .filter(contribution::Column::MessId.eq(group_id))
        .filter(contribution::Column::Period.eq(period.to_string()))
        .exec(db)
        .await?;

    let now = chrono::Utc::now();
    let mut stored = Vec::with_capacity(entries.len());
    for entry in entries {
        let model = contribution::ActiveModel {
            mess_id: Set(group_id),
            member_id: Set(entry.member_id),
            period: Set(period.to_string()),
            amount: Set(entry.amount.into()),
            note: Set(entry.note.clone()),
            added_by: Set(recorded_by),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        stored.push(model);
    }

    debug!(
        group_id,
        %period,
        removed = removed.rows_affected,
        inserted = stored.len(),
        "Replaced contributions for period"
    );
    Ok(stored)
}

async fn contributions_in_period<C>(
    db: &C,
    group_id: i64,
    period: Period,
) -> Result<Vec<contribution::Model>>
where
    C: ConnectionTrait,
{
    Contribution::find()
        .filter(contribution::Column::MessId.eq(group_id))
        .filter(contribution::Column::Period.eq(period.to_string()))
        .order_by_asc(contribution::Column::MemberId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Total contributed per member for the period.
pub async fn total_contributed<C>(
    db: &C,
    group_id: i64,
    period: Period,
) -> Result<BTreeMap<i64, Decimal>>
where
    C: ConnectionTrait,
{
    let mut totals: BTreeMap<i64, Decimal> = BTreeMap::new();
    for entry in contributions_in_period(db, group_id, period).await? {
        *totals.entry(entry.member_id).or_insert(Decimal::ZERO) += entry.amount.amount();
    }
    Ok(totals)
}

/// Lists a period's contributions ordered by member.
pub async fn list_contributions(
    db: &DatabaseConnection,
    access: &MemberAccess,
    period: Period,
) -> Result<Vec<contribution::Model>> {
    contributions_in_period(db, access.group_id(), period).await
}
