//! Payment entity - A user's claim of having paid for premium.
//!
//! Payments start out `pending`; an admin approval is the only thing that turns one into
//! premium time.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review state of a payment claim
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum PaymentStatus {
    /// Submitted, waiting for the admin
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Accepted; premium was granted
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Refused by the admin
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Payment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User who submitted the payment
    pub user_id: i64,
    /// Amount paid, in whole currency units
    pub amount: i64,
    /// Transaction reference supplied by the user
    pub txn_id: String,
    /// Current review state
    pub status: PaymentStatus,
    /// When the claim was submitted
    pub created_at: DateTimeUtc,
}

/// `Payment` refers to its user by id only, without a foreign key
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
