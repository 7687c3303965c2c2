//! Application settings loaded from the environment.
//!
//! Settings are read once at startup, after `dotenvy` has had a chance to
//! populate the process environment from a `.env` file. The token secret is
//! the only required value; everything else has a sensible default.

use crate::errors::{Error, Result};

/// Runtime configuration for the service core.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Connection URL for the backing store
    pub database_url: String,
    /// HS256 secret used to verify bearer tokens
    pub token_secret: String,
    /// Path to the TOML file holding seed data
    pub seed_config_path: String,
}

impl AppConfig {
    /// Builds the configuration from environment variables.
    ///
    /// # Errors
    /// Returns an error if `TOKEN_SECRET` is not set; verifying tokens
    /// against a guessed default would defeat the access guard.
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://data/storefront.sqlite".to_string());

        let token_secret = std::env::var("TOKEN_SECRET").map_err(|_| Error::Config {
            message: "TOKEN_SECRET must be set".to_string(),
        })?;

        let seed_config_path =
            std::env::var("SEED_CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

        Ok(Self {
            database_url,
            token_secret,
            seed_config_path,
        })
    }
}
