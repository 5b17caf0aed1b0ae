//! Ledger Discord commands - recording and listing meals and contributions.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, caller_user, commands::settlement::parse_amount, handlers::autocomplete, registered_user},
        core::{contribution, group, meal, period::{Period, parse_date}, report},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Records how many meals a member ate on a day (0-3). Managers only.
    #[poise::command(slash_command, prefix_command)]
    pub async fn meal(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Mess ID"] mess_id: i64,
        #[description = "Member who ate"] member: serenity::User,
        #[description = "Day (YYYY-MM-DD)"] date: String,
        #[description = "Number of meals, 0 to 3"] count: i32,
    ) -> Result<()> {
        meal::validate_meal_count(count)?;
        let date = parse_date(&date)?;

        let caller = caller_user(ctx).await?;
        let db = &ctx.data().database;
        let access = group::authorize_manager(db, mess_id, caller.id).await?;
        let target = registered_user(ctx, &member).await?;

        let entry = meal::record_meal(db, &access, target.id, date, count).await?;
        ctx.say(format!(
            "✅ Recorded {} meal(s) for **{}** on {}.",
            entry.meal_count, target.name, entry.date
        ))
        .await?;
        Ok(())
    }

    /// Lists the meal entries of a month.
    #[poise::command(slash_command, prefix_command)]
    pub async fn meals(
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

        let entries = meal::list_meals(db, &access, period).await?;
        let ids: Vec<i64> = entries.iter().map(|m| m.member_id).collect();
        let names = report::member_names(db, &ids).await?;
        let text = report::format_meal_list(period, &entries, &names)?;
        ctx.say(format!("```\n{text}```")).await?;
        Ok(())
    }

    /// Records what a member contributed for a month. Managers only.
    #[poise::command(slash_command, prefix_command)]
    pub async fn contribute(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Mess ID"] mess_id: i64,
        #[description = "Contributing member"] member: serenity::User,
        #[description = "Month (YYYY-MM)"]
        #[autocomplete = "autocomplete::autocomplete_period"]
        period: String,
        #[description = "Amount, e.g. 1500 or 1250.50"] amount: String,
        #[description = "Optional note"] note: Option<String>,
    ) -> Result<()> {
        let period: Period = period.parse()?;
        let amount = parse_amount("amount", &amount)?;

        let caller = caller_user(ctx).await?;
        let db = &ctx.data().database;
        let access = group::authorize_manager(db, mess_id, caller.id).await?;
        let target = registered_user(ctx, &member).await?;

        let entry = contribution::record_contribution(
            db,
            &access,
            target.id,
            period,
            amount,
            note.unwrap_or_default(),
        )
        .await?;
        ctx.say(format!(
            "✅ Recorded {:.2} from **{}** for {period}.",
            entry.amount, target.name
        ))
        .await?;
        Ok(())
    }

    /// Lists the contributions of a month.
    #[poise::command(slash_command, prefix_command)]
    pub async fn contributions(
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

        let entries = contribution::list_contributions(db, &access, period).await?;
        let ids: Vec<i64> = entries.iter().map(|c| c.member_id).collect();
        let names = report::member_names(db, &ids).await?;
        let text = report::format_contribution_list(period, &entries, &names)?;
        ctx.say(format!("```\n{text}```")).await?;
        Ok(())
    }
}

pub use inner::*;
