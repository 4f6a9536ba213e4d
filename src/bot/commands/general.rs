//! General Discord commands - ping, help, id and status.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::utils},
        core::{mapping, quota, user},
        errors::{Error, Result},
    };
    use chrono::Utc;
    use std::fmt::Write;

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        utils::register_caller(ctx).await?;
        let limit = ctx.data().settings.free_daily_limit;

        let help_text = format!(
            "**ForwardBuddy Help**\n\
            Free: {limit} forwards/day (auto reset at midnight). Premium: unlimited 💎\n\n\
            **Forwarding**\n\
            • `/forward <source> <target>` - Relay every message posted in one channel to another.\n\
            • `/mappings` - List your mappings.\n\
            • `/pause <id>` / `/resume <id>` / `/delete <id>` - Control a mapping.\n\n\
            **Account**\n\
            • `/id` - Show your user ID and this channel's ID.\n\
            • `/status` - Quota and premium status.\n\
            • `/upgrade` - Premium plans.\n\
            • `/pay <amount> <txn_id>` - Submit a payment for review.\n\n\
            **Admin**\n\
            • `/payments`, `/approve <user_id> <days>`, `/reject <payment_id>`, `/revoke <user_id>`\n\n\
            The bot must be able to read the source channel and post in the target channel."
        );

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows your user ID and the ID of the current channel.
    #[poise::command(slash_command)]
    pub async fn id(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user_id = utils::register_caller(ctx).await?;
        ctx.say(format!(
            "👤 Your ID: `{user_id}`\n💬 This channel ID: `{}`",
            ctx.channel_id()
        ))
        .await?;
        Ok(())
    }

    /// Shows today's usage, remaining quota and premium expiry.
    #[poise::command(slash_command)]
    pub async fn status(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user_id = utils::register_caller(ctx).await?;
        let data = ctx.data();
        let db = &data.database;

        let Some(account) = user::get_user(db, user_id).await? else {
            return Err(Error::UserNotFound { user_id });
        };
        let now = Utc::now();
        let policy = data.dispatcher.policy();
        let active = mapping::count_active_for_owner(db, user_id).await?;

        let remaining = policy
            .remaining(&account, now)
            .map_or_else(|| "∞".to_string(), |left| left.to_string());
        let premium = match account.premium_until {
            Some(until) if quota::is_premium(&account, now) => {
                until.format("%Y-%m-%d %H:%M UTC").to_string()
            }
            _ => "—".to_string(),
        };

        let mut text = String::from("📊 **Status**\n");
        writeln!(
            text,
            "• Used today: {}/{}",
            account.daily_count,
            policy.free_daily_limit()
        )?;
        writeln!(text, "• Remaining: {remaining}")?;
        writeln!(text, "• Premium until: {premium}")?;
        write!(text, "• Active mappings: {active}")?;

        ctx.say(text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
