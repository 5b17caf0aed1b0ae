//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the mess ledger, including all slash
//! commands, autocomplete handlers, and bot context management. Commands resolve the
//! acting user from the Discord author explicitly and pass it down to the core layer.

/// Discord command implementations (mess, ledgers, settlement, join requests, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::Settings,
    core::{settlement::ContributorPolicy, user},
    entities::user as user_entity,
    errors::{Error, ErrorKind, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands.
/// This structure holds the database connection and the loaded settings.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Settings from `config.toml`
    pub settings: Settings,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(database: DatabaseConnection, settings: Settings) -> Self {
        Self { database, settings }
    }

    /// Contributor policy configured for settlements.
    #[must_use]
    pub fn contributor_policy(&self) -> ContributorPolicy {
        ContributorPolicy::from(&self.settings.settlement)
    }
}

/// Resolves the registered user behind the command author.
pub async fn caller_user(ctx: poise::Context<'_, BotData, Error>) -> Result<user_entity::Model> {
    user::find_user_by_chat_id(&ctx.data().database, &ctx.author().id.to_string())
        .await?
        .ok_or(Error::NotRegistered)
}

/// Resolves the registered user behind a mentioned Discord account.
pub async fn registered_user(
    ctx: poise::Context<'_, BotData, Error>,
    account: &serenity::User,
) -> Result<user_entity::Model> {
    user::find_user_by_chat_id(&ctx.data().database, &account.id.to_string())
        .await?
        .ok_or_else(|| {
            Error::invalid_field("member", format!("{} has not used /register yet", account.name))
        })
}

fn user_facing_message(error: &Error) -> String {
    match error.kind() {
        ErrorKind::Internal => "❌ Something went wrong on our side. Please try again later.".to_string(),
        ErrorKind::Conflict if error.is_retryable() => format!("⚠️ {error}"),
        _ => format!("❌ {error}"),
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            if error.kind() == ErrorKind::Internal {
                error!("Error in command `{}`: {:?}", ctx.command().name, error);
            } else {
                warn!("Command `{}` rejected: {}", ctx.command().name, error);
            }
            if let Err(e) = ctx.say(user_facing_message(&error)).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Builds the framework and runs the Discord client until it stops.
#[instrument(skip_all)]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let dev_guild_id = data.settings.bot.dev_guild_id;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::register(),
                commands::mess(),
                commands::meal(),
                commands::meals(),
                commands::contribute(),
                commands::contributions(),
                commands::settle(),
                commands::settlement(),
                commands::join_request(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                if let Some(guild_id) = dev_guild_id {
                    let guild_id = serenity::GuildId::new(guild_id);
                    poise::builtins::register_in_guild(ctx, &framework.options().commands, guild_id)
                        .await?;
                    info!("Registered commands in guild {guild_id}");
                } else {
                    info!("Registering commands globally...");
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                }
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e:?}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e:?}"))?;
    Ok(())
}


pub use commands::*;
pub use handlers::*;
