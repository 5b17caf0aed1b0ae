//! Mess Discord commands - creating a mess and administering its members.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, caller_user, registered_user},
        core::{group, report},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Parent command for mess administration.
    #[poise::command(
        slash_command,
        subcommands("mess_create", "mess_members", "mess_add_member", "mess_add_manager", "mess_mine")
    )]
    pub async fn mess(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Mess administration. Available subcommands:\n\
            `/mess create` - Create a mess you own\n\
            `/mess members` - List the members of a mess\n\
            `/mess add_member` - Add a registered user (managers)\n\
            `/mess add_manager` - Promote a member to manager (owner)\n\
            `/mess mine` - List your messes";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Creates a new mess owned by you.
    #[poise::command(slash_command, rename = "create")]
    pub async fn mess_create(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the mess"] name: String,
        #[description = "Optional description"] description: Option<String>,
    ) -> Result<()> {
        let caller = caller_user(ctx).await?;
        let db = &ctx.data().database;

        let created =
            group::create_group(db, caller.id, name, description.unwrap_or_default()).await?;
        ctx.say(format!(
            "✅ Created mess **{}** (ID {}). You are its owner and manager.",
            created.name, created.id
        ))
        .await?;
        Ok(())
    }

    /// Lists the members of a mess with their ledger IDs.
    #[poise::command(slash_command, rename = "members")]
    pub async fn mess_members(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Mess ID"] mess_id: i64,
    ) -> Result<()> {
        let caller = caller_user(ctx).await?;
        let db = &ctx.data().database;
        let access = group::authorize_member(db, mess_id, caller.id).await?;

        let mess = group::get_group(db, mess_id).await?;
        let members = group::list_members(db, &access).await?;
        let ids: Vec<i64> = members.iter().map(|m| m.user_id).collect();
        let names = report::member_names(db, &ids).await?;

        let mut text = format!("**{}** members\n", mess.name);
        for member in &members {
            let name = names.get(&member.user_id).map_or("?", String::as_str);
            let role = if member.user_id == mess.owner_id {
                " (owner)"
            } else if member.is_manager {
                " (manager)"
            } else {
                ""
            };
            writeln!(text, "• {} - ID {}{role}", name, member.user_id)?;
        }
        ctx.say(text).await?;
        Ok(())
    }

    /// Adds a registered user to a mess.
    #[poise::command(slash_command, rename = "add_member")]
    pub async fn mess_add_member(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Mess ID"] mess_id: i64,
        #[description = "Discord user to add"] member: serenity::User,
    ) -> Result<()> {
        let caller = caller_user(ctx).await?;
        let db = &ctx.data().database;
        let access = group::authorize_manager(db, mess_id, caller.id).await?;
        let target = registered_user(ctx, &member).await?;

        group::add_member(db, &access, target.id).await?;
        ctx.say(format!(
            "✅ Added **{}** (ID {}) to mess {mess_id}.",
            target.name, target.id
        ))
        .await?;
        Ok(())
    }

    /// Promotes a member to manager. Only the owner may do this.
    #[poise::command(slash_command, rename = "add_manager")]
    pub async fn mess_add_manager(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Mess ID"] mess_id: i64,
        #[description = "Member to promote"] member: serenity::User,
    ) -> Result<()> {
        let caller = caller_user(ctx).await?;
        let db = &ctx.data().database;
        let target = registered_user(ctx, &member).await?;

        group::add_manager(db, mess_id, caller.id, target.id).await?;
        ctx.say(format!("✅ **{}** is now a manager of mess {mess_id}.", target.name))
            .await?;
        Ok(())
    }

    /// Lists the messes you belong to.
    #[poise::command(slash_command, rename = "mine")]
    pub async fn mess_mine(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let caller = caller_user(ctx).await?;
        let db = &ctx.data().database;

        let messes = group::groups_for_user(db, caller.id).await?;
        if messes.is_empty() {
            ctx.say("You are not a member of any mess yet.").await?;
            return Ok(());
        }

        let mut text = String::from("**Your messes**\n");
        for mess in messes {
            writeln!(text, "• {} - ID {}", mess.name, mess.id)?;
        }
        ctx.say(text).await?;
        Ok(())
    }
}

pub use inner::*;
