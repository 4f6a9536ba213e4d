//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the ForwardBuddy application:
//! slash commands, the message event handler that feeds the dispatcher, and the
//! Discord implementation of the chat platform.

/// Discord command implementations (general, mapping, premium)
pub mod commands;
/// Discord gateway event handlers
pub mod handlers;
/// Payment and premium direct messages
pub mod notifications;
/// Discord implementation of the chat platform
pub mod platform;

use crate::{
    config::{plans, settings::Settings},
    core::{dispatch::ForwardDispatcher, quota::QuotaPolicy},
    errors::{Error, Result},
};
use platform::SerenityPlatform;
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands and event handlers.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Runtime settings (admin, quota, payment handle)
    pub settings: Settings,
    /// Premium plans shown by `/upgrade`
    pub plans: plans::Config,
    /// Forwards inbound messages through the owners' mappings
    pub dispatcher: ForwardDispatcher<SerenityPlatform>,
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {error}", ctx.command().name);
            if let Err(e) = ctx.say(format!("❌ {error}")).await {
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

/// Connects to Discord and serves commands and message forwarding until `shutdown` fires.
#[instrument(skip_all)]
pub async fn run_bot(
    token: String,
    settings: Settings,
    plans: plans::Config,
    database: DatabaseConnection,
    shutdown: CancellationToken,
) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::id(),
                commands::status(),
                commands::forward(),
                commands::mappings(),
                commands::pause(),
                commands::resume(),
                commands::delete(),
                commands::upgrade(),
                commands::pay(),
                commands::payments(),
                commands::approve(),
                commands::reject(),
                commands::revoke(),
            ],
            event_handler: |ctx, event, framework, data| {
                Box::pin(handlers::events::event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered {} commands globally", framework.options().commands.len());

                let platform = Arc::new(SerenityPlatform::new(Arc::clone(&ctx.http)));
                let dispatcher = ForwardDispatcher::new(
                    database.clone(),
                    platform,
                    QuotaPolicy::new(settings.free_daily_limit),
                )
                .with_copy_timeout(settings.copy_timeout)
                .with_max_concurrent_copies(settings.max_concurrent_copies);

                Ok(BotData {
                    database,
                    settings,
                    plans,
                    dispatcher,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e}"))?;

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        shutdown.cancelled().await;
        info!("Shutting down Discord shards");
        shard_manager.shutdown_all().await;
    });

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e}"))?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;
