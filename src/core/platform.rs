//! Chat platform seam - identifiers, inbound messages and the client trait.
//!
//! The dispatcher only needs two things from the platform: copy a message to another chat,
//! and send a user a notification. Everything platform-specific lives behind
//! [`ChatPlatform`] so the forwarding engine can be exercised without a live bot.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

/// Opaque chat identifier.
///
/// Platform ids can exceed what some consumers represent exactly as numbers, so they are
/// carried as the decimal text the platform handed us.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    /// Parses an optionally signed integer literal into a chat id.
    ///
    /// The result is canonical: leading zeros are dropped and `-0` becomes `0`, so an id
    /// typed by a user matches the same id built from a number.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidChatId {
                value: raw.to_string(),
            });
        }

        let significant = digits.trim_start_matches('0');
        let canonical = match (negative, significant.is_empty()) {
            (_, true) => "0".to_string(),
            (true, false) => format!("-{significant}"),
            (false, false) => significant.to_string(),
        };
        Ok(Self(canonical))
    }

    /// The id as stored in the database.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for ChatId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for ChatId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

/// A message that appeared in a chat the bot can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Chat the message was posted in
    pub source_chat: ChatId,
    /// Platform message id within `source_chat`
    pub message_id: u64,
}

/// Outbound side of the chat platform.
///
/// Each call is a single bounded request; callers decide what to do with failures.
pub trait ChatPlatform: Send + Sync + 'static {
    /// Copies `message_id` from `source` into `destination`.
    fn copy(
        &self,
        destination: &ChatId,
        source: &ChatId,
        message_id: u64,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Sends `text` to the user directly.
    fn notify(&self, user_id: i64, text: &str) -> impl Future<Output = Result<()>> + Send;
}
