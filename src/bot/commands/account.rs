//! Account commands - linking a Discord account to a ledger user.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::user,
        errors::{Error, Result},
    };

    /// Registers your Discord account as a ledger user.
    ///
    /// The display name defaults to your Discord username. Registering twice is harmless.
    #[poise::command(slash_command, prefix_command)]
    pub async fn register(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Display name (defaults to your Discord name)"] name: Option<String>,
        #[description = "Phone number"] phone: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let chat_id = ctx.author().id.to_string();

        if let Some(existing) = user::find_user_by_chat_id(db, &chat_id).await? {
            ctx.say(format!(
                "ℹ️ You are already registered as **{}** (ID {}).",
                existing.name, existing.id
            ))
            .await?;
            return Ok(());
        }

        let name = name.unwrap_or_else(|| ctx.author().name.clone());
        let created = user::create_user(db, name, phone, Some(chat_id)).await?;
        ctx.say(format!(
            "✅ Registered as **{}**. Your ledger ID is **{}**.",
            created.name, created.id
        ))
        .await?;
        Ok(())
    }
}

pub use inner::*;
