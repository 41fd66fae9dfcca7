//! Configuration loading — TOML file with environment variable overrides.
//!
//! Reads `rowkeep.toml` from the working directory unless another path is
//! given. Every field has a default so the file is optional; environment
//! variables take precedence over file values.

use std::path::{Path, PathBuf};

use rowkeep_adapter_storage_mysql_sqlx::Config as DatabaseConfig;
use rowkeep_app::diagnostics::Diagnostics;
use serde::Deserialize;

/// Default location of the configuration file.
pub const DEFAULT_PATH: &str = "rowkeep.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `MySQL` connection settings.
    pub database: DatabaseConfig,
    /// Failure diagnostics.
    pub diagnostics: DiagnosticsConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// How statement failures are reported.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Emit failures and timings through tracing instead of the error log.
    pub verbose: bool,
    /// File that receives one JSON record per failed statement.
    pub error_log: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `path` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is unreadable or malformed, or
    /// if the resulting settings are invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("ROWKEEP_DB_HOST") {
            self.database.host = val;
        }
        if let Some(port) = lookup("ROWKEEP_DB_PORT").and_then(|val| val.parse().ok()) {
            self.database.port = port;
        }
        if let Some(val) = lookup("ROWKEEP_DB_USER") {
            self.database.user = val;
        }
        if let Some(val) = lookup("ROWKEEP_DB_PASSWORD") {
            self.database.password = val;
        }
        if let Some(val) = lookup("ROWKEEP_DB_NAME") {
            self.database.name = val;
        }
        if let Some(val) = lookup("ROWKEEP_DB_CHARSET") {
            self.database.charset = val;
        }
        if let Some(val) = lookup("ROWKEEP_VERBOSE") {
            self.diagnostics.verbose = matches!(val.as_str(), "1" | "true" | "yes");
        }
        if let Some(val) = lookup("ROWKEEP_ERROR_LOG") {
            self.diagnostics.error_log = PathBuf::from(val);
        }
        if let Some(val) = lookup("ROWKEEP_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.database.name.is_empty() {
            return Err(ConfigError::Validation(
                "database name must be set".to_string(),
            ));
        }
        Ok(())
    }

    /// Diagnostics sink matching the `[diagnostics]` section.
    #[must_use]
    pub fn diagnostics(&self) -> Diagnostics {
        if self.diagnostics.verbose {
            Diagnostics::verbose()
        } else {
            Diagnostics::logged(self.diagnostics.error_log.clone())
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            error_log: PathBuf::from("sql-error.log"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "rowkeep=info,rowkeep_app=info".to_string(),
        }
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}
