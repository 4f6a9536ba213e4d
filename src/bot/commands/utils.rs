//! Helpers shared by the slash commands.

use crate::{
    bot::BotData,
    config::settings::Settings,
    core::user,
    errors::{Error, Result},
};

/// Upserts the invoking user and returns their registry id.
pub async fn register_caller(ctx: poise::Context<'_, BotData, Error>) -> Result<i64> {
    let author = ctx.author();
    let user_id = i64::try_from(author.id.get()).map_err(|_| Error::InvalidUserId {
        value: author.id.to_string(),
    })?;
    user::ensure_user(&ctx.data().database, user_id, Some(author.name.clone())).await?;
    Ok(user_id)
}

/// Parses a user id typed as text (Discord ids overflow slash-command integers).
pub fn parse_user_id(raw: &str) -> Result<i64> {
    raw.trim()
        .trim_start_matches("<@")
        .trim_start_matches('!')
        .trim_end_matches('>')
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| Error::InvalidUserId {
            value: raw.to_string(),
        })
}

/// Fails with [`Error::Unauthorized`] unless `caller` is the configured admin.
pub fn require_admin(settings: &Settings, caller: i64) -> Result<()> {
    if settings.is_admin(caller) {
        Ok(())
    } else {
        Err(Error::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_user_id_forms() {
        assert_eq!(parse_user_id("123456789012345678").ok(), Some(123_456_789_012_345_678));
        assert_eq!(parse_user_id(" <@42> ").ok(), Some(42));
        assert_eq!(parse_user_id("<@!42>").ok(), Some(42));
    }

    #[test]
    fn test_parse_user_id_rejects_garbage() {
        for raw in ["", "abc", "0", "-5", "<@>"] {
            assert!(
                matches!(parse_user_id(raw), Err(Error::InvalidUserId { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_require_admin() -> Result<()> {
        let vars = HashMap::from([("ADMIN_ID", "42")]);
        let settings = Settings::from_lookup(|key| vars.get(key).map(|v| (*v).to_string()))?;

        assert!(require_admin(&settings, 42).is_ok());
        assert!(matches!(require_admin(&settings, 7), Err(Error::Unauthorized)));
        Ok(())
    }
}
