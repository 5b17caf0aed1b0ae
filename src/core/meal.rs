//! Meal ledger - daily meal counts per member.
//!
//! Counts are upserted by `(mess, member, date)`: recording the same day twice replaces
//! the count instead of adding a second entry. Aggregation is done in Rust over the
//! period's rows so that sums stay exact and independent of the store's SQL dialect.

use crate::{
    core::{
        group::{self, ManagerAccess, MemberAccess},
        period::Period,
    },
    entities::{Meal, meal},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::BTreeMap;
use tracing::debug;

/// Highest number of meals a member can have on one day.
pub const MAX_MEALS_PER_DAY: i32 = 3;

/// Rejects counts outside 0..=3.
pub fn validate_meal_count(count: i32) -> Result<()> {
    if count < 0 || count > MAX_MEALS_PER_DAY {
        return Err(Error::InvalidMealCount { count });
    }
    Ok(())
}

/// Records (or replaces) a member's meal count for one day.
///
/// Fails with `InvalidMealCount` for counts outside 0..=3 and with `NotAMember` when the
/// member does not belong to the mess. The acting manager is stored as `added_by`.
pub async fn record_meal(
    db: &DatabaseConnection,
    access: &ManagerAccess,
    member_id: i64,
    date: NaiveDate,
    count: i32,
) -> Result<meal::Model> {
    validate_meal_count(count)?;

    let group_id = access.group_id();
    if !group::is_member(db, group_id, member_id).await? {
        return Err(Error::NotAMember {
            group_id,
            user_id: member_id,
        });
    }

    let now = chrono::Utc::now();
    let existing = Meal::find()
        .filter(meal::Column::MessId.eq(group_id))
        .filter(meal::Column::MemberId.eq(member_id))
        .filter(meal::Column::Date.eq(date))
        .one(db)
        .await?;

    let saved = if let Some(entry) = existing {
        let mut active_model: meal::ActiveModel = entry.into();
        active_model.meal_count = Set(count);
        active_model.added_by = Set(access.user_id());
        active_model.updated_at = Set(now);
        active_model.update(db).await?
    } else {
        meal::ActiveModel {
            mess_id: Set(group_id),
            member_id: Set(member_id),
            date: Set(date),
            meal_count: Set(count),
            added_by: Set(access.user_id()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?
    };

    debug!(group_id, member_id, %date, count, "Recorded meal count");
    Ok(saved)
}

async fn meals_in_period<C>(db: &C, group_id: i64, period: Period) -> Result<Vec<meal::Model>>
where
    C: ConnectionTrait,
{
    Meal::find()
        .filter(meal::Column::MessId.eq(group_id))
        .filter(meal::Column::Date.between(period.first_day(), period.last_day()))
        .order_by_asc(meal::Column::Date)
        .order_by_asc(meal::Column::MemberId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sums meal counts per member over every day of the period.
///
/// Only members with at least one entry in the period appear in the map.
pub async fn aggregate_meals<C>(db: &C, group_id: i64, period: Period) -> Result<BTreeMap<i64, i64>>
where
    C: ConnectionTrait,
{
    let mut totals: BTreeMap<i64, i64> = BTreeMap::new();
    for entry in meals_in_period(db, group_id, period).await? {
        *totals.entry(entry.member_id).or_insert(0) += i64::from(entry.meal_count);
    }
    Ok(totals)
}

/// Lists a period's meal entries ordered by date, then member.
pub async fn list_meals(
    db: &DatabaseConnection,
    access: &MemberAccess,
    period: Period,
) -> Result<Vec<meal::Model>> {
    meals_in_period(db, access.group_id(), period).await
}
