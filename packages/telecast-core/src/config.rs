use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub telegram_gateway_url: String,
    pub telegram_api_id: i32,
    pub telegram_api_hash: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            telegram_gateway_url: env::var("TELEGRAM_GATEWAY_URL")
                .context("TELEGRAM_GATEWAY_URL must be set")?,
            telegram_api_id: env::var("TELEGRAM_API_ID")
                .context("TELEGRAM_API_ID must be set")?
                .parse()
                .context("TELEGRAM_API_ID must be a valid number")?,
            telegram_api_hash: env::var("TELEGRAM_API_HASH")
                .context("TELEGRAM_API_HASH must be set")?,
        })
    }
}
