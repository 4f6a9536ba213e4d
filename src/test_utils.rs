//! Shared test utilities for `ForwardBuddy`.
//!
//! This module provides common helper functions for setting up test databases, creating
//! users and mappings with sensible defaults, and a recording [`ChatPlatform`] fake.

use crate::{
    config,
    core::{
        dispatch::ForwardDispatcher,
        mapping,
        platform::{ChatId, ChatPlatform},
        quota::QuotaPolicy,
        user,
    },
    entities,
    errors::{Error, Result},
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::Duration,
};

/// Creates an in-memory `SQLite` database with all tables initialized.
///
/// The pool holds a single connection so every query sees the same in-memory database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await?;
    config::database::create_tables(&db).await?;
    Ok(db)
}

/// Parses a chat id literal; panics on malformed test input.
#[allow(clippy::unwrap_used)]
pub fn chat(raw: &str) -> ChatId {
    ChatId::parse(raw).unwrap()
}

/// Registers a user named `user_<id>`.
pub async fn create_test_user(db: &DatabaseConnection, user_id: i64) -> Result<entities::user::Model> {
    user::ensure_user(db, user_id, Some(format!("user_{user_id}"))).await
}

/// Creates an active mapping between two chat id literals.
pub async fn create_test_mapping(
    db: &DatabaseConnection,
    owner_id: i64,
    source: &str,
    target: &str,
) -> Result<entities::mapping::Model> {
    mapping::create_mapping(db, owner_id, &chat(source), &chat(target)).await
}

/// Builds a dispatcher over `platform` with the given daily limit.
pub fn test_dispatcher(
    db: &DatabaseConnection,
    platform: &Arc<RecordingPlatform>,
    free_daily_limit: i64,
) -> ForwardDispatcher<RecordingPlatform> {
    ForwardDispatcher::new(
        db.clone(),
        Arc::clone(platform),
        QuotaPolicy::new(free_daily_limit),
    )
}

/// Platform fake that records every call.
///
/// Destinations registered with [`RecordingPlatform::failing_on`] return an error and those
/// registered with [`RecordingPlatform::stalling_on`] never answer in test time. Both are
/// still recorded as attempts.
#[derive(Debug, Default)]
pub struct RecordingPlatform {
    copies: Mutex<Vec<(ChatId, ChatId, u64)>>,
    notifications: Mutex<Vec<(i64, String)>>,
    failing: HashSet<String>,
    stalling: HashSet<String>,
}

impl RecordingPlatform {
    /// Makes copies to `destination` fail.
    #[must_use]
    pub fn failing_on(mut self, destination: &str) -> Self {
        self.failing.insert(destination.to_string());
        self
    }

    /// Makes copies to `destination` hang.
    #[must_use]
    pub fn stalling_on(mut self, destination: &str) -> Self {
        self.stalling.insert(destination.to_string());
        self
    }

    /// Every copy attempt as `(destination, source, message_id)`.
    #[allow(clippy::unwrap_used)]
    pub fn copies(&self) -> Vec<(ChatId, ChatId, u64)> {
        self.copies.lock().unwrap().clone()
    }

    /// Destinations of every copy attempt, in attempt order.
    pub fn copy_targets(&self) -> Vec<String> {
        self.copies()
            .into_iter()
            .map(|(destination, _, _)| destination.to_string())
            .collect()
    }

    /// Every notification as `(user_id, text)`.
    #[allow(clippy::unwrap_used)]
    pub fn notifications(&self) -> Vec<(i64, String)> {
        self.notifications.lock().unwrap().clone()
    }
}

impl ChatPlatform for RecordingPlatform {
    #[allow(clippy::unwrap_used)]
    async fn copy(&self, destination: &ChatId, source: &ChatId, message_id: u64) -> Result<()> {
        self.copies
            .lock()
            .unwrap()
            .push((destination.clone(), source.clone(), message_id));

        if self.stalling.contains(destination.as_str()) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.failing.contains(destination.as_str()) {
            return Err(Error::InvalidChatId {
                value: destination.to_string(),
            });
        }
        Ok(())
    }

    #[allow(clippy::unwrap_used)]
    async fn notify(&self, user_id: i64, text: &str) -> Result<()> {
        self.notifications
            .lock()
            .unwrap()
            .push((user_id, text.to_string()));
        Ok(())
    }
}
