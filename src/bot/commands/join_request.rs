//! Membership request Discord commands - asking to join and reviewing requests.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, caller_user},
        core::{
            group,
            membership_request::{self, MemberRequestForm, RequestStatus},
        },
        entities::membership_request as request_entity,
        errors::{Error, Result},
    };
    use std::fmt::Write;

    fn format_requests(title: &str, requests: &[request_entity::Model]) -> Result<String> {
        let mut text = format!("**{title}**\n");
        if requests.is_empty() {
            text.push_str("(none)\n");
        }
        for request in requests {
            writeln!(
                text,
                "• #{} {} {} - {} | {} | tran {} | {}",
                request.id,
                request.first_name,
                request.last_name,
                request.email,
                request.phone,
                request.tran_id,
                request.status
            )?;
        }
        Ok(text)
    }

    /// Parent command for membership requests.
    #[poise::command(
        slash_command,
        subcommands("request_submit", "request_mine", "request_all", "request_approve")
    )]
    pub async fn join_request(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Membership requests. Available subcommands:\n\
            `/join_request submit` - Ask to be admitted\n\
            `/join_request mine` - Show your requests\n\
            `/join_request all` - Show every request (managers)\n\
            `/join_request approve` - Approve a request into your mess (managers)";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Submits a membership request.
    #[poise::command(slash_command, rename = "submit")]
    pub async fn request_submit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "First name"] first_name: String,
        #[description = "Last name"] last_name: String,
        #[description = "Email address"] email: String,
        #[description = "Phone number"] phone: String,
        #[description = "Payment transaction ID of the membership fee"] tran_id: String,
        #[description = "Anything the managers should know"] description: Option<String>,
    ) -> Result<()> {
        let caller = caller_user(ctx).await?;
        let form = MemberRequestForm {
            first_name,
            last_name,
            email,
            phone,
            tran_id,
            description: description.unwrap_or_default(),
        };

        let request = membership_request::submit_request(&ctx.data().database, caller.id, form).await?;
        ctx.say(format!(
            "✅ Request #{} submitted. A manager will review it.",
            request.id
        ))
        .await?;
        Ok(())
    }

    /// Shows your own membership requests.
    #[poise::command(slash_command, rename = "mine")]
    pub async fn request_mine(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let caller = caller_user(ctx).await?;
        let requests = membership_request::requests_for_user(&ctx.data().database, caller.id).await?;
        ctx.say(format_requests("Your requests", &requests)?).await?;
        Ok(())
    }

    /// Shows every membership request. Managers only.
    #[poise::command(slash_command, rename = "all")]
    pub async fn request_all(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Mess you manage"] mess_id: i64,
    ) -> Result<()> {
        let caller = caller_user(ctx).await?;
        let db = &ctx.data().database;
        let access = group::authorize_manager(db, mess_id, caller.id).await?;

        let requests = membership_request::all_requests(db, &access).await?;
        ctx.say(format_requests("All requests", &requests)?).await?;
        Ok(())
    }

    /// Approves a request and adds the requester to your mess. Managers only.
    #[poise::command(slash_command, rename = "approve")]
    pub async fn request_approve(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Mess you manage"] mess_id: i64,
        #[description = "Request number"] request_id: i64,
    ) -> Result<()> {
        let caller = caller_user(ctx).await?;
        let db = &ctx.data().database;
        let access = group::authorize_manager(db, mess_id, caller.id).await?;

        let request = membership_request::set_request_status(
            db,
            &access,
            request_id,
            RequestStatus::Approved,
        )
        .await?;
        ctx.say(format!(
            "✅ Request #{} approved. {} {} joined mess {mess_id}.",
            request.id, request.first_name, request.last_name
        ))
        .await?;
        Ok(())
    }
}

pub use inner::*;
