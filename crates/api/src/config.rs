//! Application configuration loaded from environment variables.

use axum::http::HeaderValue;
use thiserror::Error;

const DEFAULT_ORIGINS: &str = "http://localhost:5173,http://localhost:5174";

/// Errors raised while reading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Server configuration.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `9000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: PostgreSQL connection string; unset runs on the in-memory store
/// - `ACCESS_TOKEN_SECRET`: session signing secret (required)
/// - `APP_ENV`: `"production"` turns on secure cross-site cookies
/// - `CLIENT_ORIGINS`: comma-separated CORS origins
/// - `SESSION_TTL_DAYS`: session lifetime (default: `365`)
/// - `PLANT_LIST_CAP`: most plants one listing returns (default: `20`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub token_secret: String,
    pub production: bool,
    pub client_origins: Vec<String>,
    pub session_ttl_days: u32,
    pub plant_list_cap: usize,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which returns a variable's value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token_secret = lookup("ACCESS_TOKEN_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("ACCESS_TOKEN_SECRET"))?;

        let origins = lookup("CLIENT_ORIGINS").unwrap_or_else(|| DEFAULT_ORIGINS.to_string());

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", lookup("PORT"), 9000)?,
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            token_secret,
            production: lookup("APP_ENV").is_some_and(|env| env == "production"),
            client_origins: parse_origins(&origins)?,
            session_ttl_days: parse_or("SESSION_TTL_DAYS", lookup("SESSION_TTL_DAYS"), 365)?,
            plant_list_cap: parse_or("PLANT_LIST_CAP", lookup("PLANT_LIST_CAP"), 20)?,
        })
    }

    /// Development defaults with the given signing secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
            log_level: "info".to_string(),
            database_url: None,
            token_secret: secret.into(),
            production: false,
            client_origins: DEFAULT_ORIGINS.split(',').map(String::from).collect(),
            session_ttl_days: 365,
            plant_list_cap: 20,
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map(|_| origin.to_string())
                .map_err(|_| ConfigError::Invalid {
                    name: "CLIENT_ORIGINS",
                    value: origin.to_string(),
                })
        })
        .collect()
}
