//! Gateway event handler - turns posted messages into dispatches.

use crate::{
    bot::BotData,
    core::platform::{ChatId, InboundMessage},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use tracing::{error, trace};

/// Handles gateway events that are not slash commands.
///
/// Messages written by the bot itself are ignored so two mappings pointing at each other
/// cannot ping-pong. Dispatch errors are logged and never reach the message author.
pub async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    framework: poise::FrameworkContext<'_, BotData, Error>,
    data: &BotData,
) -> Result<()> {
    let serenity::FullEvent::Message { new_message } = event else {
        return Ok(());
    };

    let Some(inbound) = inbound_from(new_message, framework.bot_id) else {
        return Ok(());
    };

    trace!(source = %inbound.source_chat, message_id = inbound.message_id, "Inbound message");
    if let Err(e) = data.dispatcher.dispatch(&inbound).await {
        error!(
            source = %inbound.source_chat,
            message_id = inbound.message_id,
            error = %e,
            "Dispatch failed"
        );
    }
    Ok(())
}

fn inbound_from(message: &serenity::Message, bot_id: serenity::UserId) -> Option<InboundMessage> {
    if message.author.id == bot_id {
        return None;
    }
    if message.content.is_empty() && message.attachments.is_empty() && message.embeds.is_empty()
    {
        return None;
    }

    Some(InboundMessage {
        source_chat: ChatId::from(message.channel_id.get()),
        message_id: message.id.get(),
    })
}
