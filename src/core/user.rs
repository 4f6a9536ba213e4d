//! User registry - identity, daily usage counter and premium expiry.
//!
//! Every mutation here is a single statement scoped to one row (or one batched statement for
//! the daily reset), so concurrent dispatches never lose updates to each other.

use crate::{
    core::quota,
    entities::{User, user},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{Set, TransactionTrait, prelude::*, sea_query::OnConflict};
use tracing::{debug, info};

/// Largest single premium grant accepted, in days.
pub const MAX_PREMIUM_DAYS: i64 = 100_000;
const MAX_PREMIUM_CAS_ATTEMPTS: usize = 5;

/// Creates the user on first contact, or refreshes their display name.
///
/// Counters and premium state of an existing user are left untouched, and so is a known
/// name when `username` is `None`.
pub async fn ensure_user<C>(db: &C, user_id: i64, username: Option<String>) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let mut on_conflict = OnConflict::column(user::Column::Id);
    if username.is_some() {
        on_conflict.update_column(user::Column::Username);
    } else {
        on_conflict.do_nothing();
    }

    let model = user::ActiveModel {
        id: Set(user_id),
        username: Set(username),
        daily_count: Set(0),
        premium_until: Set(None),
    };

    User::insert(model)
        .on_conflict(on_conflict)
        .exec_without_returning(db)
        .await?;

    get_user(db, user_id)
        .await?
        .ok_or(Error::UserNotFound { user_id })
}

/// Finds a user by id.
pub async fn get_user<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Atomically adds one to the user's `daily_count` and returns the new value.
///
/// The increment is a single `UPDATE users SET daily_count = daily_count + 1` and the
/// read-back happens inside the same transaction, so N concurrent callers always move the
/// counter by exactly N and each sees its own post-increment value.
pub async fn increment_daily_count(db: &DatabaseConnection, user_id: i64) -> Result<i64> {
    use sea_orm::sea_query::Expr;

    let txn = db.begin().await?;

    let result = User::update_many()
        .col_expr(
            user::Column::DailyCount,
            Expr::col(user::Column::DailyCount).add(1),
        )
        .filter(user::Column::Id.eq(user_id))
        .exec(&txn)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::UserNotFound { user_id });
    }

    let updated = User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or(Error::UserNotFound { user_id })?;

    txn.commit().await?;
    Ok(updated.daily_count)
}

/// Sets every user's `daily_count` back to zero in one statement.
///
/// Returns the number of rows touched. Premium expiry is not modified.
pub async fn reset_daily_counts<C>(db: &C) -> Result<u64>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    let result = User::update_many()
        .col_expr(user::Column::DailyCount, Expr::value(0_i64))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Grants `days` of premium, stacking on top of any unexpired grant.
///
/// The write is a compare-and-swap on the previously read `premium_until`; if another grant
/// or revoke lands in between, the computation is redone from fresh state.
pub async fn grant_premium_days<C>(
    db: &C,
    user_id: i64,
    days: i64,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    if !(1..=MAX_PREMIUM_DAYS).contains(&days) {
        return Err(Error::InvalidDays { days });
    }
    let extension = Duration::try_days(days).ok_or(Error::InvalidDays { days })?;

    for attempt in 1..=MAX_PREMIUM_CAS_ATTEMPTS {
        let current = get_user(db, user_id)
            .await?
            .ok_or(Error::UserNotFound { user_id })?
            .premium_until;
        let new_until = quota::extend_premium(current, now, extension);

        let unchanged = match current {
            Some(until) => user::Column::PremiumUntil.eq(until),
            None => user::Column::PremiumUntil.is_null(),
        };

        let result = User::update_many()
            .col_expr(user::Column::PremiumUntil, Expr::value(new_until))
            .filter(user::Column::Id.eq(user_id))
            .filter(unchanged)
            .exec(db)
            .await?;

        if result.rows_affected == 1 {
            info!(user_id, days, until = %new_until, "Premium granted");
            return Ok(new_until);
        }
        debug!(user_id, attempt, "premium_until changed during grant, retrying");
    }

    Err(Error::ConcurrentUpdate { user_id })
}

/// Clears the user's premium expiry. Returns false if the user does not exist.
pub async fn revoke_premium<C>(db: &C, user_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    let result = User::update_many()
        .col_expr(
            user::Column::PremiumUntil,
            Expr::value(Option::<DateTime<Utc>>::None),
        )
        .filter(user::Column::Id.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        info!(user_id, "Premium revoked");
    }
    Ok(result.rows_affected > 0)
}
