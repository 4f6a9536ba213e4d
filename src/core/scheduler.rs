//! Daily reset scheduler.
//!
//! A single long-lived task that zeroes every user's `daily_count` at local midnight in a
//! fixed zone. The next midnight is recomputed from the wall clock on every cycle, and long
//! waits are sliced so a clock jump or a suspended process only delays a reset by one slice.

use crate::core::user;
use chrono::{DateTime, Days, FixedOffset, TimeZone, Utc};
use sea_orm::ConnectionTrait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Longest single sleep before the wall clock is consulted again.
const MAX_SLEEP_SLICE: Duration = Duration::from_secs(300);

/// The first local midnight in `zone` strictly after `now`.
#[must_use]
pub fn next_reset_after(now: DateTime<Utc>, zone: FixedOffset) -> DateTime<Utc> {
    now.with_timezone(&zone)
        .date_naive()
        .checked_add_days(Days::new(1))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|midnight| zone.from_local_datetime(&midnight).single())
        .map_or_else(
            || now + chrono::Duration::days(1),
            |midnight| midnight.with_timezone(&Utc),
        )
}

/// Runs one reset. Failures are logged; returns whether the reset went through.
pub async fn run_reset_cycle<C>(db: &C) -> bool
where
    C: ConnectionTrait,
{
    match user::reset_daily_counts(db).await {
        Ok(users) => {
            info!(users, "Daily counts reset");
            true
        }
        Err(e) => {
            error!(error = %e, "Daily reset failed; will retry at next midnight");
            false
        }
    }
}

/// Resets daily counters at every local midnight in `zone` until `cancel` fires.
pub async fn run_reset_scheduler<C>(db: C, zone: FixedOffset, cancel: CancellationToken)
where
    C: ConnectionTrait,
{
    loop {
        let next_reset = next_reset_after(Utc::now(), zone);
        info!(at = %next_reset.with_timezone(&zone), "Daily reset scheduled");

        if !wait_until(next_reset, &cancel).await {
            info!("Reset scheduler stopped");
            return;
        }

        run_reset_cycle(&db).await;
    }
}

/// Sleeps until the wall clock reaches `deadline`. Returns false if cancelled first.
async fn wait_until(deadline: DateTime<Utc>, cancel: &CancellationToken) -> bool {
    loop {
        let Ok(remaining) = (deadline - Utc::now()).to_std() else {
            return true;
        };
        if remaining.is_zero() {
            return true;
        }

        tokio::select! {
            () = cancel.cancelled() => return false,
            () = tokio::time::sleep(remaining.min(MAX_SLEEP_SLICE)) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(330 * 60).unwrap()
    }

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_next_reset_is_next_local_midnight() {
        // 20:00 IST on the 10th -> midnight IST on the 11th == 18:30 UTC on the 10th
        let now = utc("2026-03-10T14:30:00Z");
        assert_eq!(next_reset_after(now, ist()), utc("2026-03-10T18:30:00Z"));
    }

    #[test]
    fn test_next_reset_when_utc_date_lags_local_date() {
        // 19:00 UTC on the 10th is already 00:30 IST on the 11th
        let now = utc("2026-03-10T19:00:00Z");
        assert_eq!(next_reset_after(now, ist()), utc("2026-03-11T18:30:00Z"));
    }

    #[test]
    fn test_exact_midnight_schedules_the_following_day() {
        let now = utc("2026-03-10T18:30:00Z");
        assert_eq!(next_reset_after(now, ist()), utc("2026-03-11T18:30:00Z"));
    }

    #[test]
    fn test_next_reset_crosses_month_and_year() {
        let now = utc("2026-12-31T12:00:00Z");
        assert_eq!(next_reset_after(now, ist()), utc("2026-12-31T18:30:00Z"));

        let utc_zone = FixedOffset::east_opt(0).unwrap();
        assert_eq!(
            next_reset_after(utc("2026-12-31T23:59:59Z"), utc_zone),
            utc("2027-01-01T00:00:00Z")
        );
    }

    #[test]
    fn test_next_reset_is_always_within_a_day() {
        let now = Utc::now();
        let next = next_reset_after(now, ist());
        assert!(next > now);
        assert!(next - now <= chrono::Duration::days(1));
    }

    #[tokio::test]
    async fn test_reset_cycle_resets_counts() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, 1).await?;
        user::increment_daily_count(&db, 1).await?;

        assert!(run_reset_cycle(&db).await);
        assert_eq!(user::get_user(&db, 1).await?.unwrap().daily_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_cycle_failure_is_swallowed() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        db.execute_unprepared("DROP TABLE users").await?;

        assert!(!run_reset_cycle(&db).await);
        Ok(())
    }

    #[tokio::test]
    async fn test_scheduler_stops_on_cancel() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run_reset_scheduler(db, ist(), cancel.clone()));
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        Ok(())
    }

    #[tokio::test]
    async fn test_wait_until_past_deadline_returns_immediately() {
        let cancel = CancellationToken::new();
        assert!(wait_until(Utc::now() - chrono::Duration::seconds(1), &cancel).await);
    }
}
