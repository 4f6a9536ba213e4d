//! Mapping Discord commands - create, list, pause, resume and delete forwarding rules.
//!
//! Ids that are missing and ids owned by someone else get the same "not found" answer.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::utils, platform::channel_id},
        core::{mapping, platform::ChatId},
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Number of mappings shown by `/mappings` before the list is cut short.
    const MAX_LISTED: usize = 25;

    /// Relays every message posted in one channel to another.
    #[poise::command(slash_command)]
    pub async fn forward(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Channel ID to read from"] source: String,
        #[description = "Channel ID to post into"] target: String,
    ) -> Result<()> {
        let owner_id = utils::register_caller(ctx).await?;

        let (Ok(source), Ok(target)) = (ChatId::parse(&source), ChatId::parse(&target)) else {
            ctx.say("❌ Usage: `/forward <source_channel_id> <target_channel_id>`")
                .await?;
            return Ok(());
        };
        if channel_id(&source).is_err() || channel_id(&target).is_err() {
            ctx.say("❌ Channel IDs look wrong. Use `/id` inside a channel to get its ID.")
                .await?;
            return Ok(());
        }
        if source == target {
            ctx.say("❌ Source and target must be different channels.")
                .await?;
            return Ok(());
        }

        let created = mapping::create_mapping(&ctx.data().database, owner_id, &source, &target).await?;
        ctx.say(format!(
            "✅ Mapping #{} created:\n`{source}` → `{target}`",
            created.id
        ))
        .await?;
        Ok(())
    }

    /// Lists your mappings, newest first.
    #[poise::command(slash_command)]
    pub async fn mappings(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let owner_id = utils::register_caller(ctx).await?;
        let rows = mapping::list_mappings(&ctx.data().database, owner_id).await?;

        if rows.is_empty() {
            ctx.say("ℹ️ No mappings yet. Use `/forward <source> <target>`.")
                .await?;
            return Ok(());
        }

        let mut text = String::from("🗂 **Your Mappings**\n\n");
        for row in rows.iter().take(MAX_LISTED) {
            writeln!(
                text,
                "#{} — `{}` → `{}` — {}",
                row.id,
                row.source_chat,
                row.target_chat,
                if row.active { "✅ active" } else { "⏸ paused" }
            )?;
        }
        if rows.len() > MAX_LISTED {
            write!(text, "…and {} more", rows.len() - MAX_LISTED)?;
        }

        ctx.say(text).await?;
        Ok(())
    }

    /// Stops forwarding through a mapping without deleting it.
    #[poise::command(slash_command)]
    pub async fn pause(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Mapping ID from /mappings"] mapping_id: i64,
    ) -> Result<()> {
        let owner_id = utils::register_caller(ctx).await?;
        if !mapping::set_active(&ctx.data().database, owner_id, mapping_id, false).await? {
            return Err(Error::MappingNotFound { mapping_id });
        }
        ctx.say(format!("⏸ Mapping #{mapping_id} paused")).await?;
        Ok(())
    }

    /// Resumes forwarding through a paused mapping.
    #[poise::command(slash_command)]
    pub async fn resume(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Mapping ID from /mappings"] mapping_id: i64,
    ) -> Result<()> {
        let owner_id = utils::register_caller(ctx).await?;
        if !mapping::set_active(&ctx.data().database, owner_id, mapping_id, true).await? {
            return Err(Error::MappingNotFound { mapping_id });
        }
        ctx.say(format!("▶ Mapping #{mapping_id} resumed")).await?;
        Ok(())
    }

    /// Deletes a mapping permanently.
    #[poise::command(slash_command)]
    pub async fn delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Mapping ID from /mappings"] mapping_id: i64,
    ) -> Result<()> {
        let owner_id = utils::register_caller(ctx).await?;
        if !mapping::delete_mapping(&ctx.data().database, owner_id, mapping_id).await? {
            return Err(Error::MappingNotFound { mapping_id });
        }
        ctx.say(format!("🗑 Mapping #{mapping_id} deleted")).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
