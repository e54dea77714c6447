use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: usize,
}

#[derive(Debug, Clone)]
pub struct WebSocketConfig {
    /// How often the server pings each connection
    pub heartbeat_interval: Duration,
    /// Silence after which a connection is dropped
    pub client_timeout: Duration,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(5),
            client_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// `None` runs the service on the in-memory store
    pub database: Option<DatabaseConfig>,
    pub max_ciphertext_bytes: usize,
    pub websocket: WebSocketConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let port = parse_var("PORT", 3000)?;

        let database = match env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(DatabaseConfig {
                url,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 16)?,
            }),
            _ => None,
        };

        let max_ciphertext_bytes = parse_var("MAX_CIPHERTEXT_BYTES", 64 * 1024)?;

        let heartbeat_secs: u64 = parse_var("WS_HEARTBEAT_INTERVAL_SECS", 5)?;
        let timeout_secs: u64 = parse_var("WS_CLIENT_TIMEOUT_SECS", 30)?;
        if timeout_secs <= heartbeat_secs {
            return Err(AppError::Config(
                "WS_CLIENT_TIMEOUT_SECS must exceed WS_HEARTBEAT_INTERVAL_SECS".into(),
            ));
        }

        Ok(Self {
            port,
            database,
            max_ciphertext_bytes,
            websocket: WebSocketConfig {
                heartbeat_interval: Duration::from_secs(heartbeat_secs),
                client_timeout: Duration::from_secs(timeout_secs),
            },
        })
    }

    /// In-memory configuration for tests and local runs
    pub fn test_defaults() -> Self {
        Self {
            port: 0,
            database: None,
            max_ciphertext_bytes: 64 * 1024,
            websocket: WebSocketConfig::default(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{name} has invalid value {raw:?}"))),
        Err(_) => Ok(default),
    }
}
