//! Settlement Discord commands - computing and viewing a month's settlement.
//!
//! `/settle` takes the whole contribution list of the month in one text argument,
//! `member_id:amount[:note]` entries separated by commas, e.g. `3:4000, 7:2000:rice`.

use crate::{
    core::contribution::ContributionInput,
    errors::{Error, Result, ValidationErrors},
};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses a money amount typed by a user.
pub fn parse_amount(field: &str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value.trim())
        .map_err(|_| Error::invalid_field(field, format!("'{}' is not a number", value.trim())))
}

/// Parses `member_id:amount[:note]` entries separated by commas.
///
/// Every malformed entry is reported; range checks are left to the settlement request.
pub fn parse_contribution_list(input: &str) -> Result<Vec<ContributionInput>> {
    let mut errors = ValidationErrors::new();
    let mut entries = Vec::new();

    for (index, raw) in input.split(',').map(str::trim).enumerate() {
        if raw.is_empty() {
            continue;
        }
        let field = format!("contributions[{index}]");
        let mut parts = raw.splitn(3, ':');
        let member = parts.next().unwrap_or_default().trim();
        let Some(amount) = parts.next() else {
            errors.push(field, format!("'{raw}' should look like member_id:amount"));
            continue;
        };
        let note = parts.next().unwrap_or_default().trim().to_string();

        let Ok(member_id) = member.parse::<i64>() else {
            errors.push(format!("{field}.member_id"), format!("'{member}' is not a member ID"));
            continue;
        };
        match parse_amount(&format!("{field}.amount"), amount) {
            Ok(amount) => entries.push(ContributionInput {
                member_id,
                amount,
                note,
            }),
            Err(Error::Validation(found)) => {
                for e in found.fields() {
                    errors.push(e.field.clone(), e.message.clone());
                }
            }
            Err(other) => return Err(other),
        }
    }

    errors.into_result()?;
    Ok(entries)
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::{parse_amount, parse_contribution_list};
    use crate::{
        bot::{BotData, caller_user, handlers::autocomplete},
        core::{
            group,
            period::Period,
            report,
            settlement::{SettlementRequest, compute_settlement, get_settlement},
        },
        errors::{Error, Result},
    };
    use rust_decimal::Decimal;

    /// Computes a month's settlement, replacing the month's contributions. Managers only.
    ///
    /// Meal counts come from the recorded meal entries; the contribution list given here
    /// becomes the month's complete contribution record.
    #[poise::command(slash_command, prefix_command)]
    pub async fn settle(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Mess ID"] mess_id: i64,
        #[description = "Month (YYYY-MM)"]
        #[autocomplete = "autocomplete::autocomplete_period"]
        period: String,
        #[description = "member_id:amount[:note] entries separated by commas"] contributions: String,
        #[description = "Extra cost shared by meals (default 0)"] extra_cost: Option<String>,
    ) -> Result<()> {
        let request = SettlementRequest {
            period: period.parse()?,
            extra_cost: match extra_cost {
                Some(value) => parse_amount("extra_cost", &value)?,
                None => Decimal::ZERO,
            },
            contributions: parse_contribution_list(&contributions)?,
        };

        let caller = caller_user(ctx).await?;
        let db = &ctx.data().database;
        let access = group::authorize_manager(db, mess_id, caller.id).await?;

        let sheet =
            compute_settlement(db, &access, &request, ctx.data().contributor_policy()).await?;

        let ids: Vec<i64> = sheet.rows.iter().map(|r| r.member_id).collect();
        let names = report::member_names(db, &ids).await?;
        let text = report::format_settlement_summary(&sheet, &names)?;
        ctx.say(format!("✅ Settlement computed.\n```\n{text}```")).await?;
        Ok(())
    }

    /// Shows the stored settlement of a month.
    #[poise::command(slash_command, prefix_command)]
    pub async fn settlement(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Mess ID"] mess_id: i64,
        #[description = "Month (YYYY-MM)"]
        #[autocomplete = "autocomplete::autocomplete_period"]
        period: String,
    ) -> Result<()> {
        let period: Period = period.parse()?;
        let caller = caller_user(ctx).await?;
        let db = &ctx.data().database;
        let access = group::authorize_member(db, mess_id, caller.id).await?;

        let Some(sheet) = get_settlement(db, &access, period).await? else {
            ctx.say(format!("📭 No settlement has been computed for {period} yet."))
                .await?;
            return Ok(());
        };

        let ids: Vec<i64> = sheet.rows.iter().map(|r| r.member_id).collect();
        let names = report::member_names(db, &ids).await?;
        let text = report::format_settlement_summary(&sheet, &names)?;
        ctx.say(format!("```\n{text}```")).await?;
        Ok(())
    }
}

pub use inner::*;
