//! Environment-driven configuration.
//!
//! | Env Var                    | Default                 |
//! |----------------------------|-------------------------|
//! | `HOST`                     | `0.0.0.0`               |
//! | `PORT`                     | `3000`                  |
//! | `CORS_ORIGINS`             | `http://localhost:5173` |
//! | `REQUEST_TIMEOUT_SECS`     | `30`                    |
//! | `SHUTDOWN_TIMEOUT_SECS`    | `30`                    |
//! | `LOG_FORMAT`               | `pretty` (or `json`)    |
//! | `DATABASE_URL`             | required                |
//! | `DATABASE_MAX_CONNECTIONS` | `20`                    |
//! | `JWT_SECRET`               | required                |
//! | `JWT_ACCESS_EXPIRY_MINS`   | `60`                    |

use std::fmt::Display;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines for local development.
    #[default]
    Pretty,
    /// One JSON object per event, for log shippers.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// How long shutdown waits for the notification writer to drain.
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// # Panics
    ///
    /// Panics on malformed values or a missing `JWT_SECRET`.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins: parse_origins(&env_or(
                "CORS_ORIGINS",
                "http://localhost:5173".to_string(),
            )),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            jwt: JwtConfig::from_env(),
        }
    }
}

/// Database settings, read separately so the pool can be built before the
/// rest of the server.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// # Panics
    ///
    /// Panics if `DATABASE_URL` is unset or `DATABASE_MAX_CONNECTIONS` is
    /// not a number.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", 20),
        }
    }
}

pub fn log_format_from_env() -> LogFormat {
    env_or("LOG_FORMAT", LogFormat::default())
}

/// Read and parse `key`, falling back to `default` when unset.
///
/// # Panics
///
/// Panics when the variable is set but does not parse.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
