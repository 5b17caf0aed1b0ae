//! Settlement repository - one settlement (header + member rows) per mess and period.
//!
//! Replacement is all-or-nothing: [`replace_settlement`] runs on the caller's transaction
//! and deletes the previous header and every row before inserting the new ones. The
//! unique index on `(mess_id, period)` backs the one-per-period rule at the store level;
//! a violation, or `SQLite` reporting the database busy, means another recompute of the
//! same period got there first and is reported as `ConcurrentModification`.

use crate::{
    core::period::Period,
    entities::{Settlement, SettlementRow, settlement, settlement_row},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, SqlErr, prelude::*};
use tracing::{debug, warn};

/// A stored settlement with its member rows ordered by member ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementSheet {
    /// Totals for the period
    pub header: settlement::Model,
    /// One row per settled member
    pub rows: Vec<settlement_row::Model>,
}

impl SettlementSheet {
    /// Row of one member, if the member was settled.
    #[must_use]
    pub fn row_for(&self, member_id: i64) -> Option<&settlement_row::Model> {
        self.rows.iter().find(|r| r.member_id == member_id)
    }

    /// Sum of the cost attributed to members.
    #[must_use]
    pub fn total_attributed(&self) -> Decimal {
        self.rows.iter().map(|r| r.total_cost.amount()).sum()
    }

    /// Sum of what the settled members contributed.
    #[must_use]
    pub fn total_contributed(&self) -> Decimal {
        self.rows.iter().map(|r| r.contributed_amount.amount()).sum()
    }

    /// Sum of member balances.
    #[must_use]
    pub fn total_balance(&self) -> Decimal {
        self.rows.iter().map(|r| r.balance.amount()).sum()
    }
}

/// Header values of a settlement about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSettlement {
    /// Mess being settled
    pub group_id: i64,
    /// Settled period
    pub period: Period,
    /// Sum of contributions
    pub bazaar_cost: Decimal,
    /// Extra cost on top of contributions
    pub extra_cost: Decimal,
    /// `bazaar_cost + extra_cost`
    pub total_cost: Decimal,
    /// Meals eaten in the period
    pub total_meals: i64,
    /// Cost per meal, rounded for storage
    pub cost_per_meal: Decimal,
    /// Acting manager
    pub calculated_by: i64,
}

/// Member row values of a settlement about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSettlementRow {
    /// Settled member
    pub member_id: i64,
    /// Meals the member ate
    pub total_meals: i64,
    /// Cost attributed to the member
    pub total_cost: Decimal,
    /// What the member contributed
    pub contributed_amount: Decimal,
    /// `contributed_amount - total_cost`
    pub balance: Decimal,
}

/// Maps a write failure during replacement to the error the caller should see.
pub(crate) fn classify_write_error(err: DbErr, group_id: i64, period: Period) -> Error {
    let busy = {
        let message = err.to_string().to_lowercase();
        message.contains("database is locked") || message.contains("database is busy")
    };
    if busy || matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        warn!(group_id, %period, "Concurrent settlement write detected: {err}");
        return Error::ConcurrentModification {
            group_id,
            period: period.to_string(),
        };
    }
    Error::Database(err)
}

async fn find_header<C>(db: &C, group_id: i64, period: Period) -> Result<Option<settlement::Model>>
where
    C: ConnectionTrait,
{
    Settlement::find()
        .filter(settlement::Column::MessId.eq(group_id))
        .filter(settlement::Column::Period.eq(period.to_string()))
        .one(db)
        .await
        .map_err(Into::into)
}

async fn rows_for<C>(db: &C, settlement_id: i64) -> Result<Vec<settlement_row::Model>>
where
    C: ConnectionTrait,
{
    SettlementRow::find()
        .filter(settlement_row::Column::SettlementId.eq(settlement_id))
        .order_by_asc(settlement_row::Column::MemberId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes any settlement of `(group_id, period)` with all its rows, then stores the
/// new header and rows. Must run on the caller's transaction.
pub(crate) async fn replace_settlement<C>(
    db: &C,
    new: NewSettlement,
    rows: Vec<NewSettlementRow>,
) -> Result<SettlementSheet>
where
    C: ConnectionTrait,
{
    let group_id = new.group_id;
    let period = new.period;
    let classify = |err: DbErr| classify_write_error(err, group_id, period);

    let previous: Vec<i64> = Settlement::find()
        .filter(settlement::Column::MessId.eq(group_id))
        .filter(settlement::Column::Period.eq(period.to_string()))
        .all(db)
        .await
        .map_err(classify)?
        .into_iter()
        .map(|s| s.id)
        .collect();

    if !previous.is_empty() {
        let removed_rows = SettlementRow::delete_many()
            .filter(settlement_row::Column::SettlementId.is_in(previous.clone()))
            .exec(db)
            .await
            .map_err(classify)?;
        Settlement::delete_many()
            .filter(settlement::Column::Id.is_in(previous))
            .exec(db)
            .await
            .map_err(classify)?;
        debug!(
            group_id,
            %period,
            removed_rows = removed_rows.rows_affected,
            "Removed previous settlement"
        );
    }

    let header = settlement::ActiveModel {
        mess_id: Set(group_id),
        period: Set(period.to_string()),
        bazaar_cost: Set(new.bazaar_cost.into()),
        extra_cost: Set(new.extra_cost.into()),
        total_cost: Set(new.total_cost.into()),
        total_meals: Set(new.total_meals),
        cost_per_meal: Set(new.cost_per_meal.into()),
        calculated_by: Set(new.calculated_by),
        calculated_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(classify)?;

    let mut stored = Vec::with_capacity(rows.len());
    for row in rows {
        let model = settlement_row::ActiveModel {
            settlement_id: Set(header.id),
            member_id: Set(row.member_id),
            total_meals: Set(row.total_meals),
            total_cost: Set(row.total_cost.into()),
            contributed_amount: Set(row.contributed_amount.into()),
            balance: Set(row.balance.into()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(classify)?;
        stored.push(model);
    }
    stored.sort_by_key(|r| r.member_id);

    Ok(SettlementSheet {
        header,
        rows: stored,
    })
}

/// Reads back the settlement of `(group_id, period)`, if one was computed.
pub async fn find_settlement<C>(
    db: &C,
    group_id: i64,
    period: Period,
) -> Result<Option<SettlementSheet>>
where
    C: ConnectionTrait,
{
    let Some(header) = find_header(db, group_id, period).await? else {
        return Ok(None);
    };
    let rows = rows_for(db, header.id).await?;
    Ok(Some(SettlementSheet { header, rows }))
}

/// Number of stored settlements for `(group_id, period)`; never more than one.
pub async fn count_settlements<C>(db: &C, group_id: i64, period: Period) -> Result<u64>
where
    C: ConnectionTrait,
{
    Settlement::find()
        .filter(settlement::Column::MessId.eq(group_id))
        .filter(settlement::Column::Period.eq(period.to_string()))
        .count(db)
        .await
        .map_err(Into::into)
}
