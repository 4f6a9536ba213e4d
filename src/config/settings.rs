//! Runtime settings loaded from environment variables.
//!
//! Values come from the process environment (after `.env` has been loaded by `dotenvy`).
//! The bot token is not part of [`Settings`]; `main` reads it right before
//! starting the client.

use crate::errors::{Error, Result};
use chrono::FixedOffset;
use std::time::Duration;

/// Forwards a non-premium user may make per day when nothing is configured.
pub const DEFAULT_FREE_DAILY_LIMIT: i64 = 50;
/// India Standard Time, UTC+05:30.
pub const DEFAULT_RESET_UTC_OFFSET_MINUTES: i32 = 330;
const DEFAULT_COPY_TIMEOUT_SECS: u64 = 15;
const DEFAULT_MAX_CONCURRENT_COPIES: usize = 8;

/// Application settings shared by the dispatcher, the scheduler and the commands.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Platform user ID allowed to approve, reject and revoke premium
    pub admin_id: i64,
    /// Daily forward quota for non-premium users
    pub free_daily_limit: i64,
    /// Zone whose midnight triggers the daily reset
    pub reset_zone: FixedOffset,
    /// Payment handle shown by `/upgrade`, if configured
    pub upi_id: Option<String>,
    /// Upper bound for one copy request to the platform
    pub copy_timeout: Duration,
    /// How many copies for one owner may be in flight at once
    pub max_concurrent_copies: usize,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    ///
    /// `ADMIN_ID` is required. `FREE_DAILY_LIMIT` falls back to the older `DAILY_LIMIT` name
    /// and then to [`DEFAULT_FREE_DAILY_LIMIT`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let admin_id = lookup("ADMIN_ID").ok_or_else(|| Error::Config {
            message: "ADMIN_ID missing in environment".to_string(),
        })?;
        let admin_id = parse_number::<i64>("ADMIN_ID", &admin_id)?;

        let free_daily_limit = match lookup("FREE_DAILY_LIMIT").or_else(|| lookup("DAILY_LIMIT")) {
            Some(raw) => parse_number::<i64>("FREE_DAILY_LIMIT", &raw)?,
            None => DEFAULT_FREE_DAILY_LIMIT,
        };
        if free_daily_limit <= 0 {
            return Err(Error::Config {
                message: format!("FREE_DAILY_LIMIT must be positive, got {free_daily_limit}"),
            });
        }

        let offset_minutes = match lookup("RESET_UTC_OFFSET_MINUTES") {
            Some(raw) => parse_number::<i32>("RESET_UTC_OFFSET_MINUTES", &raw)?,
            None => DEFAULT_RESET_UTC_OFFSET_MINUTES,
        };
        let reset_zone = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| Error::Config {
                message: format!("RESET_UTC_OFFSET_MINUTES out of range: {offset_minutes}"),
            })?;

        let copy_timeout = match lookup("COPY_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number::<u64>("COPY_TIMEOUT_SECS", &raw)?),
            None => Duration::from_secs(DEFAULT_COPY_TIMEOUT_SECS),
        };

        let max_concurrent_copies = match lookup("MAX_CONCURRENT_COPIES") {
            Some(raw) => parse_number::<usize>("MAX_CONCURRENT_COPIES", &raw)?.max(1),
            None => DEFAULT_MAX_CONCURRENT_COPIES,
        };

        let upi_id = lookup("UPI_ID").filter(|v| !v.trim().is_empty());

        Ok(Self {
            admin_id,
            free_daily_limit,
            reset_zone,
            upi_id,
            copy_timeout,
            max_concurrent_copies,
        })
    }

    /// Whether `user_id` is the configured admin.
    #[must_use]
    pub const fn is_admin(&self, user_id: i64) -> bool {
        self.admin_id == user_id
    }
}

fn parse_number<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| Error::Config {
        message: format!("{key} is not a valid number ({raw:?}): {e}"),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_apply() {
        let settings = settings_from(&[("ADMIN_ID", "42")]).unwrap();
        assert_eq!(settings.admin_id, 42);
        assert_eq!(settings.free_daily_limit, DEFAULT_FREE_DAILY_LIMIT);
        assert_eq!(settings.reset_zone.local_minus_utc(), 330 * 60);
        assert_eq!(settings.copy_timeout, Duration::from_secs(15));
        assert_eq!(settings.max_concurrent_copies, 8);
        assert!(settings.upi_id.is_none());
        assert!(settings.is_admin(42));
        assert!(!settings.is_admin(7));
    }

    #[test]
    fn test_missing_admin_is_an_error() {
        let result = settings_from(&[("FREE_DAILY_LIMIT", "10")]);
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_legacy_daily_limit_name() {
        let settings = settings_from(&[("ADMIN_ID", "1"), ("DAILY_LIMIT", "7")]).unwrap();
        assert_eq!(settings.free_daily_limit, 7);

        let settings = settings_from(&[
            ("ADMIN_ID", "1"),
            ("DAILY_LIMIT", "7"),
            ("FREE_DAILY_LIMIT", "9"),
        ])
        .unwrap();
        assert_eq!(settings.free_daily_limit, 9);
    }

    #[test]
    fn test_rejects_non_positive_limit() {
        assert!(settings_from(&[("ADMIN_ID", "1"), ("FREE_DAILY_LIMIT", "0")]).is_err());
        assert!(settings_from(&[("ADMIN_ID", "1"), ("FREE_DAILY_LIMIT", "abc")]).is_err());
    }

    #[test]
    fn test_custom_zone_and_blank_upi() {
        let settings = settings_from(&[
            ("ADMIN_ID", "1"),
            ("RESET_UTC_OFFSET_MINUTES", "-300"),
            ("UPI_ID", "  "),
        ])
        .unwrap();
        assert_eq!(settings.reset_zone.local_minus_utc(), -300 * 60);
        assert!(settings.upi_id.is_none());
    }
}
