//! Reading store configuration types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Environment variable names recognized by [`StoreConfig::from_env`].
pub const ENV_HOST: &str = "DB_HOST";
pub const ENV_PORT: &str = "DB_PORT";
pub const ENV_USER: &str = "DB_USER";
pub const ENV_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_NAME: &str = "DB_NAME";
pub const ENV_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";
pub const ENV_ACQUIRE_TIMEOUT: &str = "DB_ACQUIRE_TIMEOUT_SECS";

/// Invalid store configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: String, value: String },

    /// A required field was not provided to the builder
    #[error("Missing required field: {0}")]
    Missing(&'static str),
}

/// Connection settings for the MySQL-compatible reading store.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database host
    pub host: String,
    /// Database port
    pub port: u16,
    /// Database user
    pub user: String,
    /// Database credential
    pub password: String,
    /// Database (schema) name
    pub database: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
    /// How long a request waits for a pooled connection
    pub acquire_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: "ecosense".to_string(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

impl StoreConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary key lookup.
    ///
    /// Unset keys fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            host: lookup(ENV_HOST).unwrap_or(defaults.host),
            port: parse_var(&lookup, ENV_PORT)?.unwrap_or(defaults.port),
            user: lookup(ENV_USER).unwrap_or(defaults.user),
            password: lookup(ENV_PASSWORD).unwrap_or(defaults.password),
            database: lookup(ENV_NAME).unwrap_or(defaults.database),
            max_connections: parse_var(&lookup, ENV_MAX_CONNECTIONS)?
                .unwrap_or(defaults.max_connections),
            acquire_timeout: parse_var(&lookup, ENV_ACQUIRE_TIMEOUT)?
                .map(Duration::from_secs)
                .unwrap_or(defaults.acquire_timeout),
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                value,
            }),
    }
}

/// Builder for StoreConfig.
#[derive(Debug, Default)]
pub struct StoreConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    user: Option<String>,
    password: Option<String>,
    database: Option<String>,
    max_connections: Option<u32>,
    acquire_timeout: Option<Duration>,
}

impl StoreConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host.
    pub fn host(mut self, host: &str) -> Self {
        self.host = Some(host.to_string());
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the user.
    pub fn user(mut self, user: &str) -> Self {
        self.user = Some(user.to_string());
        self
    }

    /// Set the password.
    pub fn password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    /// Set the database name.
    pub fn database(mut self, database: &str) -> Self {
        self.database = Some(database.to_string());
        self
    }

    /// Set the pool size.
    pub fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = Some(max_connections);
        self
    }

    /// Set the pool acquire timeout.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = Some(timeout);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<StoreConfig, ConfigError> {
        let defaults = StoreConfig::default();
        Ok(StoreConfig {
            host: self.host.ok_or(ConfigError::Missing("host"))?,
            database: self.database.ok_or(ConfigError::Missing("database"))?,
            port: self.port.unwrap_or(defaults.port),
            user: self.user.unwrap_or(defaults.user),
            password: self.password.unwrap_or(defaults.password),
            max_connections: self.max_connections.unwrap_or(defaults.max_connections),
            acquire_timeout: self.acquire_timeout.unwrap_or(defaults.acquire_timeout),
        })
    }
}
