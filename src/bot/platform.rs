//! Discord implementation of [`ChatPlatform`].
//!
//! Discord has no server-side "copy message", so a copy fetches the original from the source
//! channel and re-sends its content, embeds and attachments unchanged.

use crate::{
    core::platform::{ChatId, ChatPlatform},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// [`ChatPlatform`] backed by the bot's HTTP client.
#[derive(Clone)]
pub struct SerenityPlatform {
    http: Arc<serenity::Http>,
}

impl SerenityPlatform {
    /// Wraps the HTTP client of a running bot.
    #[must_use]
    pub const fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

/// Discord channel for a chat id; Discord ids are positive 64-bit snowflakes.
pub(crate) fn channel_id(chat: &ChatId) -> Result<serenity::ChannelId> {
    chat.as_str()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(serenity::ChannelId::new)
        .ok_or_else(|| Error::InvalidChatId {
            value: chat.to_string(),
        })
}

impl ChatPlatform for SerenityPlatform {
    async fn copy(&self, destination: &ChatId, source: &ChatId, message_id: u64) -> Result<()> {
        let source_channel = channel_id(source)?;
        let destination_channel = channel_id(destination)?;
        if message_id == 0 {
            return Err(Error::InvalidMessageId { message_id });
        }

        let original = source_channel
            .message(self.http.as_ref(), serenity::MessageId::new(message_id))
            .await?;

        let mut files = Vec::with_capacity(original.attachments.len());
        for attachment in &original.attachments {
            let data = attachment.download().await?;
            files.push(serenity::CreateAttachment::bytes(
                data,
                attachment.filename.clone(),
            ));
        }

        let embeds = original
            .embeds
            .into_iter()
            .map(serenity::CreateEmbed::from)
            .collect::<Vec<_>>();

        let builder = serenity::CreateMessage::new()
            .content(original.content)
            .embeds(embeds)
            .add_files(files);

        destination_channel
            .send_message(self.http.as_ref(), builder)
            .await?;
        Ok(())
    }

    async fn notify(&self, user_id: i64, text: &str) -> Result<()> {
        let user = u64::try_from(user_id)
            .ok()
            .filter(|id| *id != 0)
            .map(serenity::UserId::new)
            .ok_or(Error::UserNotFound { user_id })?;

        user.direct_message(
            self.http.as_ref(),
            serenity::CreateMessage::new().content(text),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::chat;

    #[test]
    fn test_channel_id_accepts_snowflakes() {
        let id = channel_id(&chat("1180000000000000001")).ok();
        assert_eq!(id.map(serenity::ChannelId::get), Some(1_180_000_000_000_000_001));
    }

    #[test]
    fn test_channel_id_rejects_non_discord_ids() {
        for raw in ["-100123", "0", "99999999999999999999999"] {
            assert!(matches!(
                channel_id(&chat(raw)),
                Err(Error::InvalidChatId { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_copy_rejects_message_id_zero_before_any_request() {
        let platform = SerenityPlatform::new(Arc::new(serenity::Http::new("")));

        let result = platform.copy(&chat("200"), &chat("100"), 0).await;
        assert!(matches!(
            result,
            Err(Error::InvalidMessageId { message_id: 0 })
        ));
    }
}
