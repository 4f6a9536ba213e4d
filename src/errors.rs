//! Unified error type for `ForwardBuddy`.
//!
//! Storage, platform and validation failures all funnel into [`Error`]. Delivery and
//! scheduler failures are recovered where they happen and only ever logged; the variants
//! below that reach a user are rendered by the bot's `on_error` hook.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("User {user_id} not found")]
    UserNotFound { user_id: i64 },

    /// Covers both missing mappings and mappings owned by someone else.
    #[error("Mapping #{mapping_id} not found")]
    MappingNotFound { mapping_id: i64 },

    #[error("Payment #{payment_id} not found")]
    PaymentNotFound { payment_id: i64 },

    #[error("Invalid chat id: {value:?}")]
    InvalidChatId { value: String },

    #[error("Invalid number of days: {days}")]
    InvalidDays { days: i64 },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: i64 },

    #[error("'{value}' is not a user id")]
    InvalidUserId { value: String },

    #[error("Transaction id cannot be empty")]
    InvalidTxnId,

    #[error("Invalid message id: {message_id}")]
    InvalidMessageId { message_id: u64 },

    #[error("Concurrent update on user {user_id} did not settle")]
    ConcurrentUpdate { user_id: i64 },

    #[error("Copy to {destination} timed out")]
    CopyTimeout { destination: String },

    #[error("Not authorized")]
    Unauthorized,

    #[error("Serenity/Poise framework error: {0}")]
    Platform(Box<poise::serenity_prelude::Error>),

    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Platform(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
