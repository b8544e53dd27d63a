//! Runtime configuration, read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `CONTACTS_BIND_ADDR` | `127.0.0.1:3000` |
//! | `CONTACTS_STORE_URL` | `memory://localhost/contacts` |
//! | `CONTACTS_REQUEST_TIMEOUT_MS` | `10000` |
//! | `CONTACTS_STORE_BUFFER` | `32` |
//!
//! A variable that is set but unparsable is an error, never a silent default.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const BIND_ADDR_VAR: &str = "CONTACTS_BIND_ADDR";
pub const STORE_URL_VAR: &str = "CONTACTS_STORE_URL";
pub const REQUEST_TIMEOUT_VAR: &str = "CONTACTS_REQUEST_TIMEOUT_MS";
pub const STORE_BUFFER_VAR: &str = "CONTACTS_STORE_BUFFER";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("unsupported store scheme `{0}`")]
    UnsupportedStore(String),
}

/// Storage engines a connection string can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
}

/// A parsed store connection string such as `memory://localhost/contacts`.
///
/// Only the scheme is interpreted; it selects the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreUrl {
    pub backend: StoreBackend,
    raw: String,
}

impl FromStr for StoreUrl {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s).map_err(|e| ConfigError::Invalid {
            var: STORE_URL_VAR,
            value: s.to_string(),
            reason: e.to_string(),
        })?;
        let backend = match url.scheme() {
            "memory" => StoreBackend::Memory,
            other => return Err(ConfigError::UnsupportedStore(other.to_string())),
        };
        Ok(Self {
            backend,
            raw: s.to_string(),
        })
    }
}

impl fmt::Display for StoreUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub store_url: StoreUrl,
    pub request_timeout: Duration,
    pub store_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            store_url: StoreUrl {
                backend: StoreBackend::Memory,
                raw: "memory://localhost/contacts".to_string(),
            },
            request_timeout: Duration::from_secs(10),
            store_buffer: 32,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let store_buffer = parse_var(&lookup, STORE_BUFFER_VAR, defaults.store_buffer)?;
        if store_buffer == 0 {
            return Err(ConfigError::Invalid {
                var: STORE_BUFFER_VAR,
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(Self {
            bind_addr: parse_var(&lookup, BIND_ADDR_VAR, defaults.bind_addr)?,
            store_url: parse_var(&lookup, STORE_URL_VAR, defaults.store_url)?,
            request_timeout: Duration::from_millis(parse_var(
                &lookup,
                REQUEST_TIMEOUT_VAR,
                defaults.request_timeout.as_millis() as u64,
            )?),
            store_buffer,
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}
