use dotenvy::dotenv;
use forward_buddy::{
    bot,
    config::{self, plans, settings::Settings},
    core::scheduler,
    errors::{Error, Result},
};
use std::env;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Settings and premium plans
    let settings = Settings::from_env().inspect_err(|e| error!("Invalid settings: {e}"))?;
    let plans = plans::load_default_config()?;
    info!(
        free_daily_limit = settings.free_daily_limit,
        plans = plans.plans.len(),
        "Loaded configuration"
    );

    // 4. Database
    let db = config::database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    config::database::create_tables(&db).await?;
    info!("Database initialized successfully.");

    // 5. Background daily reset, stopped by the same token as the bot
    let shutdown = CancellationToken::new();
    tokio::spawn(scheduler::run_reset_scheduler(
        db.clone(),
        settings.reset_zone,
        shutdown.clone(),
    ));
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    // 6. Run the bot; the token is read right before use and never stored
    let token = env::var("DISCORD_BOT_TOKEN").map_err(|_| Error::Config {
        message: "DISCORD_BOT_TOKEN missing in environment".to_string(),
    })?;

    bot::run_bot(token, settings, plans, db, shutdown.clone()).await?;
    shutdown.cancel();
    info!("Bye");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
