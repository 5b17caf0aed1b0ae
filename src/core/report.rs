//! Plain-text rendering of ledgers and settlement sheets.
//!
//! Formatting is framework-agnostic; the bot layer only wraps the text in a code block.
//! Members are shown by name when known, otherwise by ID.

use crate::{
    core::{period::Period, settlement_store::SettlementSheet, user},
    entities::{contribution, meal},
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Display names keyed by user ID.
pub type MemberNames = BTreeMap<i64, String>;

/// Looks up display names for the given users. Unknown IDs are simply absent.
pub async fn member_names<C>(db: &C, user_ids: &[i64]) -> Result<MemberNames>
where
    C: ConnectionTrait,
{
    Ok(user::list_users_by_ids(db, user_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u.name))
        .collect())
}

fn display_name(names: &MemberNames, user_id: i64) -> String {
    names
        .get(&user_id)
        .cloned()
        .unwrap_or_else(|| format!("#{user_id}"))
}

/// Formats money with two decimals and an explicit sign for balances.
#[must_use]
pub fn format_balance(balance: Decimal) -> String {
    if balance > Decimal::ZERO {
        format!("+{balance:.2}")
    } else {
        format!("{balance:.2}")
    }
}

/// Renders a settlement sheet: totals first, then one line per member.
pub fn format_settlement_summary(sheet: &SettlementSheet, names: &MemberNames) -> Result<String> {
    let header = &sheet.header;
    let mut summary = format!("Settlement {}\n", header.period);
    writeln!(
        summary,
        "  Bazaar: {:.2} | Extra: {:.2} | Total: {:.2}",
        header.bazaar_cost, header.extra_cost, header.total_cost
    )?;
    writeln!(
        summary,
        "  Meals: {} | Cost per meal: {:.2}\n",
        header.total_meals, header.cost_per_meal
    )?;

    if sheet.rows.is_empty() {
        summary.push_str("  No meals were recorded for this period.\n");
        return Ok(summary);
    }

    for row in &sheet.rows {
        writeln!(
            summary,
            "  {} - {} meals | cost {:.2} | paid {:.2} | balance {}",
            display_name(names, row.member_id),
            row.total_meals,
            row.total_cost,
            row.contributed_amount,
            format_balance(row.balance.amount())
        )?;
    }
    Ok(summary)
}

/// Renders a period's meal entries grouped by day.
pub fn format_meal_list(period: Period, entries: &[meal::Model], names: &MemberNames) -> Result<String> {
    let mut out = format!("Meals {period}\n");
    if entries.is_empty() {
        out.push_str("  (none)\n");
        return Ok(out);
    }

    let mut totals: BTreeMap<i64, i64> = BTreeMap::new();
    for entry in entries {
        writeln!(
            out,
            "  {} {} x{}",
            entry.date.format("%Y-%m-%d"),
            display_name(names, entry.member_id),
            entry.meal_count
        )?;
        *totals.entry(entry.member_id).or_default() += i64::from(entry.meal_count);
    }

    out.push_str("Totals\n");
    for (member_id, total) in totals {
        writeln!(out, "  {}: {total}", display_name(names, member_id))?;
    }
    Ok(out)
}

/// Renders a period's contributions with their sum.
pub fn format_contribution_list(
    period: Period,
    entries: &[contribution::Model],
    names: &MemberNames,
) -> Result<String> {
    let mut out = format!("Contributions {period}\n");
    if entries.is_empty() {
        out.push_str("  (none)\n");
        return Ok(out);
    }

    for entry in entries {
        write!(
            out,
            "  {}: {:.2}",
            display_name(names, entry.member_id),
            entry.amount
        )?;
        if entry.note.is_empty() {
            out.push('\n');
        } else {
            writeln!(out, " ({})", entry.note)?;
        }
    }
    let total: Decimal = entries.iter().map(|e| e.amount.amount()).sum();
    writeln!(out, "Total: {total:.2}")?;
    Ok(out)
}
