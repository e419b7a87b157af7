//! Server configuration
//!
//! Values come from the environment (a `.env` file is loaded when present). CLI
//! flags override them through the `with_*` setters.

use std::env;
use std::str::FromStr;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Default maximum number of records per batch request
pub const DEFAULT_MAX_BATCH: usize = 5000;

/// Default capacity of the log broadcast channel
pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Runtime settings of the HTTP surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub max_batch: usize,
    pub log_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_batch: DEFAULT_MAX_BATCH,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl ServerConfig {
    /// Load from `GRIDKEY_PORT`, `GRIDKEY_MAX_BATCH` and `GRIDKEY_LOG_CAPACITY`.
    ///
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Self {
        // Try loading .env file
        let _ = dotenvy::dotenv();

        Self {
            port: env_or("GRIDKEY_PORT", DEFAULT_PORT),
            max_batch: env_or("GRIDKEY_MAX_BATCH", DEFAULT_MAX_BATCH),
            log_capacity: env_or("GRIDKEY_LOG_CAPACITY", DEFAULT_LOG_CAPACITY).max(1),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch;
        self
    }

    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity.max(1);
        self
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
