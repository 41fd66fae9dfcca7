//! `MySQL` connection settings.

use serde::Deserialize;
use sqlx::mysql::MySqlConnectOptions;

use crate::backend::MySqlBackend;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3306;
const DEFAULT_CHARSET: &str = "utf8mb4";

/// Errors raised while reading connection settings from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable `{0}` is not set")]
    Missing(&'static str),

    #[error("environment variable `{key}` has invalid value `{value}`")]
    Invalid { key: &'static str, value: String },
}

/// Configuration for the `MySQL` storage adapter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Schema to select after connecting.
    pub name: String,
    pub charset: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: "root".to_string(),
            password: String::new(),
            name: String::new(),
            charset: DEFAULT_CHARSET.to_string(),
        }
    }
}

impl Config {
    /// Read configuration from environment variables.
    ///
    /// `ROWKEEP_DB_NAME` is required; `ROWKEEP_DB_HOST`, `ROWKEEP_DB_PORT`,
    /// `ROWKEEP_DB_USER`, `ROWKEEP_DB_PASSWORD` and `ROWKEEP_DB_CHARSET`
    /// fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the database name is missing or the port is
    /// not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self {
            name: lookup("ROWKEEP_DB_NAME").ok_or(ConfigError::Missing("ROWKEEP_DB_NAME"))?,
            ..Self::default()
        };
        if let Some(host) = lookup("ROWKEEP_DB_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("ROWKEEP_DB_PORT") {
            config.port = port.parse().map_err(|_| ConfigError::Invalid {
                key: "ROWKEEP_DB_PORT",
                value: port,
            })?;
        }
        if let Some(user) = lookup("ROWKEEP_DB_USER") {
            config.user = user;
        }
        if let Some(password) = lookup("ROWKEEP_DB_PASSWORD") {
            config.password = password;
        }
        if let Some(charset) = lookup("ROWKEEP_DB_CHARSET") {
            config.charset = charset;
        }
        Ok(config)
    }

    /// sqlx connection options for these settings.
    #[must_use]
    pub fn connect_options(&self) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name)
            .charset(&self.charset);
        if self.password.is_empty() {
            options
        } else {
            options.password(&self.password)
        }
    }

    /// Build a [`MySqlBackend`] from this configuration.
    ///
    /// No connection is made here; the link is opened on the first statement.
    #[must_use]
    pub fn build(&self) -> MySqlBackend {
        MySqlBackend::new(self.connect_options())
    }
}
