//! Config - Settings for the inventory adapter and the document service.
//!
//! Defaults can be overridden from the environment:
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `STOCKROOM_COLLECTION` | collection holding inventory documents | `inventory` |
//! | `STOCKROOM_ADDR` | document service bind address | `127.0.0.1:8080` |
//! | `STOCKROOM_WRITE_MODE` | `overwrite` or `merge` | `merge` |
//! | `STOCKROOM_CONCURRENCY` | `unguarded` or `optimistic` | `optimistic` |
//! | `STOCKROOM_MAX_ATTEMPTS` | tries per mutation under `optimistic` | `8` |

use std::fmt;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::document::WriteMode;
use crate::inventory::{Concurrency, MutationPolicy, DEFAULT_COLLECTION};

pub const ENV_COLLECTION: &str = "STOCKROOM_COLLECTION";
pub const ENV_ADDR: &str = "STOCKROOM_ADDR";
pub const ENV_WRITE_MODE: &str = "STOCKROOM_WRITE_MODE";
pub const ENV_CONCURRENCY: &str = "STOCKROOM_CONCURRENCY";
pub const ENV_MAX_ATTEMPTS: &str = "STOCKROOM_MAX_ATTEMPTS";

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub collection: String,
    pub bind_addr: String,
    pub policy: MutationPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            bind_addr: DEFAULT_ADDR.to_string(),
            policy: MutationPolicy::default(),
        }
    }
}

/// Error type for configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid { key: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, value } => {
                write!(f, "invalid value for {}: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Defaults overridden by `STOCKROOM_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(collection) = lookup(ENV_COLLECTION) {
            config.collection = collection;
        }
        if let Some(addr) = lookup(ENV_ADDR) {
            config.bind_addr = addr;
        }
        if let Some(mode) = lookup(ENV_WRITE_MODE) {
            config.policy.write_mode = match mode.trim().to_ascii_lowercase().as_str() {
                "overwrite" => WriteMode::Overwrite,
                "merge" => WriteMode::Merge,
                _ => return Err(invalid(ENV_WRITE_MODE, mode)),
            };
        }
        if let Some(concurrency) = lookup(ENV_CONCURRENCY) {
            config.policy.concurrency = match concurrency.trim().to_ascii_lowercase().as_str() {
                "unguarded" => Concurrency::Unguarded,
                "optimistic" => Concurrency::Optimistic,
                _ => return Err(invalid(ENV_CONCURRENCY, concurrency)),
            };
        }
        if let Some(attempts) = lookup(ENV_MAX_ATTEMPTS) {
            config.policy.max_attempts = attempts
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| invalid(ENV_MAX_ATTEMPTS, attempts.clone()))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values a caller may have set directly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collection.is_empty() || self.collection.contains('/') {
            return Err(invalid(ENV_COLLECTION, self.collection.clone()));
        }
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|_| invalid(ENV_ADDR, self.bind_addr.clone()))
    }
}

fn invalid(key: &str, value: String) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value,
    }
}
