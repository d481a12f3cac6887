//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use chrono::FixedOffset;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// When unset, progress is kept in memory and lost on restart.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub program_path: PathBuf,
    pub content_path: PathBuf,
    /// The UTC offset whose midnight separates challenge days.
    pub day_boundary: FixedOffset,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // --- Server and Database Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Program and Content Files ---
        let program_path = lookup("PROGRAM_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data/program.json"));
        let content_path = lookup("CONTENT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data/content.json"));

        // --- Calendar Settings ---
        let offset_str = lookup("DAY_BOUNDARY_OFFSET_MINUTES").unwrap_or_else(|| "0".to_string());
        let day_boundary = offset_str
            .trim()
            .parse::<i32>()
            .ok()
            .and_then(|minutes| minutes.checked_mul(60))
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "DAY_BOUNDARY_OFFSET_MINUTES".to_string(),
                    format!("'{}' is not a UTC offset in minutes", offset_str),
                )
            })?;

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            program_path,
            content_path,
            day_boundary,
            cors_origin,
        })
    }
}
