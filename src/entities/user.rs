//! User entity - One row per platform user who has talked to the bot.
//!
//! Holds the per-day forward counter and the premium expiry. Rows are created by an
//! idempotent upsert and never deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Platform user ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// Display name at the time of the last interaction
    pub username: Option<String>,
    /// Forwards charged since the last daily reset
    #[sea_orm(default_value = 0)]
    pub daily_count: i64,
    /// Premium expiry; `None` or a past instant means not premium
    pub premium_until: Option<DateTimeUtc>,
}

/// `User` is linked to mappings and payments by id only; users are never deleted
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
