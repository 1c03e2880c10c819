//! Runtime configuration parsed from environment variables.
//!
//! Optional:
//! - `PORT`: listen port, default 3000
//! - `DATABASE_URL`: Postgres URL; the in-memory store is used when unset
//! - `DB_MAX_CONNECTIONS`: pool size, default 5
//! - `FLUSH_INTERVAL_MS`: persistence flush period, default 250
//! - `COOKIE_SECURE`: mark the identity cookie `Secure`, default false
//! - `STATIC_DIR`: directory served under `/static`

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 250;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub flush_interval_ms: u64,
    pub cookie_secure: bool,
    pub static_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            cookie_secure: false,
            static_dir: default_static_dir(),
        }
    }
}

impl AppConfig {
    /// Build typed config from the process environment.
    ///
    /// Unset variables fall back to defaults; set-but-malformed numeric or
    /// boolean values are rejected so a typo never silently changes behavior.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            port: parse_or("PORT", lookup("PORT"), defaults.port)?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"), defaults.db_max_connections)?,
            flush_interval_ms: parse_or("FLUSH_INTERVAL_MS", lookup("FLUSH_INTERVAL_MS"), defaults.flush_interval_ms)?,
            cookie_secure: match lookup("COOKIE_SECURE") {
                None => defaults.cookie_secure,
                Some(raw) => {
                    parse_bool(&raw).ok_or(ConfigError::Invalid { key: "COOKIE_SECURE", value: raw })?
                }
            },
            static_dir: lookup("STATIC_DIR").map_or(defaults.static_dir, PathBuf::from),
        })
    }
}

fn default_static_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static")
}

fn parse_or<T: std::str::FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
