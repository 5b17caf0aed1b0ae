//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    ///
    /// This is a simple health check command that doesn't require any database operations.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**Mess Ledger Help**\n\
        Track shared meals and split the monthly bazaar cost by meals eaten.\n\n\
        **Getting Started**\n\
        • `/register [name] [phone]` - Links your Discord account to a ledger user.\n\
        • `/join_request submit ...` - Asks a mess to admit you.\n\n\
        **Mess Commands**\n\
        • `/mess create <name> [description]` - Creates a mess you own.\n\
        • `/mess mine` - Lists the messes you belong to.\n\
        • `/mess members <mess_id>` - Lists members with their ledger IDs.\n\
        • `/mess add_member <mess_id> <member>` - Adds a registered user (managers).\n\
        • `/mess add_manager <mess_id> <member>` - Promotes a member (owner only).\n\n\
        **Ledger Commands**\n\
        • `/meal <mess_id> <member> <date> <count>` - Records 0-3 meals for a day (managers).\n\
        • `/meals <mess_id> <period>` - Lists a month's meals.\n\
        • `/contribute <mess_id> <member> <period> <amount> [note]` - Records a contribution (managers).\n\
        • `/contributions <mess_id> <period>` - Lists a month's contributions.\n\n\
        **Settlement Commands**\n\
        • `/settle <mess_id> <period> <contributions> [extra_cost]` - Computes the month (managers).\n  \
          Contributions are `member_id:amount[:note]` separated by commas.\n\
        • `/settlement <mess_id> <period>` - Shows the stored settlement.\n\n\
        **Utility Commands**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
