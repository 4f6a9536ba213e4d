//! Payment records and premium approval.
//!
//! Users submit a claim (`pending`); the admin either rejects it or approves premium for the
//! user, which also settles that user's pending claims. Approval is the only path that grants
//! premium time.

use crate::{
    core::user,
    entities::{Payment, PaymentStatus, payment},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Records a pending payment claim.
pub async fn create_payment<C>(
    db: &C,
    user_id: i64,
    amount: i64,
    txn_id: &str,
) -> Result<payment::Model>
where
    C: ConnectionTrait,
{
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }
    let txn_id = txn_id.trim();
    if txn_id.is_empty() {
        return Err(Error::InvalidTxnId);
    }

    let model = payment::ActiveModel {
        user_id: Set(user_id),
        amount: Set(amount),
        txn_id: Set(txn_id.to_string()),
        status: Set(PaymentStatus::Pending),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(payment_id = created.id, user_id, amount, "Payment submitted");
    Ok(created)
}

/// Finds a payment by id.
pub async fn get_payment<C>(db: &C, payment_id: i64) -> Result<Option<payment::Model>>
where
    C: ConnectionTrait,
{
    Payment::find_by_id(payment_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Pending payments, oldest first.
pub async fn list_pending_payments<C>(db: &C) -> Result<Vec<payment::Model>>
where
    C: ConnectionTrait,
{
    Payment::find()
        .filter(payment::Column::Status.eq(PaymentStatus::Pending))
        .order_by_asc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Changes a payment's status. Returns false if the payment does not exist.
pub async fn set_payment_status<C>(db: &C, payment_id: i64, status: PaymentStatus) -> Result<bool>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    let result = Payment::update_many()
        .col_expr(payment::Column::Status, Expr::value(status))
        .filter(payment::Column::Id.eq(payment_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}

/// Rejects a pending claim. Returns false if it was already approved or rejected.
pub async fn reject_payment<C>(db: &C, payment_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let Some(claim) = get_payment(db, payment_id).await? else {
        return Err(Error::PaymentNotFound { payment_id });
    };
    if claim.status != PaymentStatus::Pending {
        return Ok(false);
    }

    set_payment_status(db, payment_id, PaymentStatus::Rejected).await?;
    info!(payment_id, user_id = claim.user_id, "Payment rejected");
    Ok(true)
}

/// Grants `days` of premium to `user_id` and marks their pending payments approved.
///
/// Returns the new premium expiry.
pub async fn approve_premium<C>(
    db: &C,
    user_id: i64,
    days: i64,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    let until = user::grant_premium_days(db, user_id, days, now).await?;

    let settled = Payment::update_many()
        .col_expr(payment::Column::Status, Expr::value(PaymentStatus::Approved))
        .filter(payment::Column::UserId.eq(user_id))
        .filter(payment::Column::Status.eq(PaymentStatus::Pending))
        .exec(db)
        .await?;

    info!(
        user_id,
        days,
        settled_payments = settled.rows_affected,
        "Premium approved"
    );
    Ok(until)
}
