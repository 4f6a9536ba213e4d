//! Mapping entity - A routing rule from one source chat to one destination chat.
//!
//! Chat identifiers are stored as text so large platform ids survive untouched.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Mapping database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "mappings")]
pub struct Model {
    /// Unique identifier for the mapping
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User who created the mapping and whose quota it consumes
    pub owner_id: i64,
    /// Chat whose messages are relayed
    pub source_chat: String,
    /// Chat that receives the copies
    pub target_chat: String,
    /// Paused mappings are invisible to dispatch
    pub active: bool,
    /// When the mapping was created
    pub created_at: DateTimeUtc,
}

/// `Mapping` refers to its owner by id only, without a foreign key
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
