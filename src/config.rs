//! Server configuration.
//!
//! Settings come from environment variables with sensible defaults, so
//! the binary runs without any setup.

use std::net::SocketAddr;
use thiserror::Error;

/// Environment variable holding the listen address.
pub const BIND_ADDR_VAR: &str = "TAX_BIND_ADDR";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a socket address: {source}")]
    InvalidBindAddr {
        var: &'static str,
        value: String,
        source: std::net::AddrParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = value
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr { var: BIND_ADDR_VAR, value, source })?;
        Ok(Self { bind_addr })
    }
}
