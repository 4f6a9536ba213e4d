/// Database configuration and connection management
pub mod database;

/// Premium plan catalogue loading from config.toml
pub mod plans;

/// Runtime settings read from environment variables
pub mod settings;
