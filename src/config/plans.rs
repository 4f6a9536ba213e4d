//! Premium plan catalogue loading from config.toml
//!
//! Plans only drive what `/upgrade` shows; the admin still decides how many days to grant
//! when approving a payment.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Premium plans offered to users
    #[serde(default = "default_plans")]
    pub plans: Vec<PlanConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plans: default_plans(),
        }
    }
}

/// One purchasable premium plan
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PlanConfig {
    /// Price in whole currency units
    pub amount: i64,
    /// Premium days granted for this price
    pub days: i64,
    /// Short label such as "1 Month"
    pub label: String,
}

fn default_plans() -> Vec<PlanConfig> {
    [(150, 30, "1 Month"), (400, 90, "3 Months"), (1200, 36500, "Lifetime")]
        .into_iter()
        .map(|(amount, days, label)| PlanConfig {
            amount,
            days,
            label: label.to_string(),
        })
        .collect()
}

/// Loads plan configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A plan has a non-positive amount or day count
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;
    parse_config(&contents)
}

fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if let Some(bad) = config.plans.iter().find(|p| p.amount <= 0 || p.days <= 0) {
        return Err(Error::Config {
            message: format!("Plan '{}' must have a positive amount and days", bad.label),
        });
    }

    Ok(config)
}

/// Loads ./config.toml, falling back to the built-in plans when the file is absent.
pub fn load_default_config() -> Result<Config> {
    let path = Path::new("config.toml");
    if path.exists() {
        load_config(path)
    } else {
        tracing::info!("No config.toml found, using built-in premium plans");
        Ok(Config::default())
    }
}
