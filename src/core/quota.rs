//! Quota policy - decides whether a forward is allowed and whether it costs quota.
//!
//! Premium users are never charged. Everyone else gets `free_daily_limit` chargeable
//! forwards per day; once the counter reaches the limit their mappings go quiet until the
//! next reset.

use crate::entities::user;
use chrono::{DateTime, Duration, Utc};

/// Outcome of evaluating one user for one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    /// Active premium: allowed, no debit
    Premium,
    /// Under the free limit: allowed, debit exactly once
    Chargeable,
    /// Free limit reached: skip every destination, no debit
    Exhausted,
}

impl QuotaDecision {
    /// Whether copies should be attempted.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        !matches!(self, Self::Exhausted)
    }

    /// Whether the owner's counter must be incremented.
    #[must_use]
    pub const fn is_chargeable(self) -> bool {
        matches!(self, Self::Chargeable)
    }
}

/// Daily quota rules for non-premium users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    free_daily_limit: i64,
}

impl QuotaPolicy {
    /// Creates a policy with the given per-day limit.
    #[must_use]
    pub const fn new(free_daily_limit: i64) -> Self {
        Self { free_daily_limit }
    }

    /// The configured per-day limit.
    #[must_use]
    pub const fn free_daily_limit(&self) -> i64 {
        self.free_daily_limit
    }

    /// Evaluates `user` at instant `now`.
    #[must_use]
    pub fn evaluate(&self, user: &user::Model, now: DateTime<Utc>) -> QuotaDecision {
        if is_premium(user, now) {
            QuotaDecision::Premium
        } else if user.daily_count < self.free_daily_limit {
            QuotaDecision::Chargeable
        } else {
            QuotaDecision::Exhausted
        }
    }

    /// True when the forward is allowed and must be debited.
    #[must_use]
    pub fn is_chargeable_and_allowed(&self, user: &user::Model, now: DateTime<Utc>) -> bool {
        self.evaluate(user, now).is_chargeable()
    }

    /// Forwards left today; `None` means unlimited.
    #[must_use]
    pub fn remaining(&self, user: &user::Model, now: DateTime<Utc>) -> Option<i64> {
        if is_premium(user, now) {
            None
        } else {
            Some((self.free_daily_limit - user.daily_count).max(0))
        }
    }
}

/// Premium means an expiry strictly after `now`.
#[must_use]
pub fn is_premium(user: &user::Model, now: DateTime<Utc>) -> bool {
    user.premium_until.is_some_and(|until| until > now)
}

/// New expiry after granting `days` on top of `current`.
///
/// An unexpired grant is extended from its end; otherwise the grant starts at `now`.
#[must_use]
pub fn extend_premium(
    current: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    days: Duration,
) -> DateTime<Utc> {
    let base = current.map_or(now, |until| until.max(now));
    base + days
}
