//! Server configuration, read once from the environment at startup.

use std::fmt::Display;
use std::str::FromStr;

use crate::auth::token::AuthConfig;

const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Upper bound on one request, including time spent waiting for the
    /// user's queue lock.
    pub request_timeout_secs: u64,
    /// How long the notification relay gets to drain after the listener
    /// stops.
    pub shutdown_timeout_secs: u64,
    pub db_max_connections: u32,
    /// Completion events buffered per subscriber before the relay lags.
    pub event_bus_capacity: usize,
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    /// | `DB_MAX_CONNECTIONS`    | `20`                    |
    /// | `EVENT_BUS_CAPACITY`    | `256`                   |
    ///
    /// See [`AuthConfig::from_env`] for the token settings.
    ///
    /// # Panics
    ///
    /// Panics on a value that does not parse.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins: parse_origins(&env_or("CORS_ORIGINS", DEFAULT_CORS_ORIGIN.to_string())),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", backlog_db::DEFAULT_MAX_CONNECTIONS),
            event_bus_capacity: env_or("EVENT_BUS_CAPACITY", backlog_events::DEFAULT_CAPACITY),
            auth: AuthConfig::from_env(),
        }
    }
}

/// Parse `key` from the environment, or `default` when it is unset.
///
/// # Panics
///
/// Panics if the variable is set but does not parse as `T`.
pub(crate) fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|err| panic!("{key} has an invalid value '{raw}': {err}")),
        Err(_) => default,
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
