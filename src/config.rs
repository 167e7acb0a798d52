//! Environment-driven settings for the server and the customer client.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::domain::order::RestaurantSettings;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub admin_password: String,
    pub menu_file: Option<PathBuf>,
    pub initial_settings: RestaurantSettings,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", "a valid port number", 8080)?,
            admin_password: lookup("ADMIN_PASSWORD").unwrap_or_else(|| "admin".to_string()),
            menu_file: lookup("MENU_FILE")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            initial_settings: RestaurantSettings {
                accepting_orders: parse_or(&lookup, "ACCEPTING_ORDERS", "true or false", true)?,
                prep_time_minutes: parse_or(
                    &lookup,
                    "PREP_TIME_MINUTES",
                    "a whole number of minutes",
                    20,
                )?,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub token_file: PathBuf,
    pub poll_interval: Duration,
    pub admin_password: Option<String>,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        const POLL: &str = "POLL_INTERVAL_SECS";
        const POSITIVE: &str = "a positive number of seconds";
        let secs: u64 = parse_or(&lookup, POLL, POSITIVE, 5)?;
        if secs == 0 {
            return Err(ConfigError::Invalid {
                name: POLL,
                expected: POSITIVE,
                value: secs.to_string(),
            });
        }
        Ok(Self {
            api_base_url: lookup("API_BASE_URL")
                .unwrap_or_else(|| "http://127.0.0.1:8080".to_string()),
            token_file: lookup("TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".order-token.json")),
            poll_interval: Duration::from_secs(secs),
            admin_password: lookup("ADMIN_PASSWORD").filter(|p| !p.is_empty()),
        })
    }
}
