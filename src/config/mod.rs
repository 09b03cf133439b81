//! Configuration management.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `ITEMGATE_*` environment variables.
//!
//! # Example TOML
//!
//! ```toml
//! backend = "sqlite"
//! data_dir = "/var/lib/itemgate"
//!
//! [observability.logging]
//! filter = "itemgate=debug"
//! format = "json"
//!
//! [observability.metrics]
//! enabled = true
//! ```

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name of the `SQLite` database inside the data directory.
pub const DATABASE_FILE_NAME: &str = "items.db";

/// Which item backend the binary wires into the save path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Process-local, non-durable store.
    Memory,
    /// `SQLite` database under the data directory.
    #[default]
    Sqlite,
}

impl BackendKind {
    /// Returns the backend name as used in config files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in-memory" | "inmemory" => Ok(Self::Memory),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            other => Err(Error::InvalidInput(format!(
                "unknown backend '{other}' (expected 'memory' or 'sqlite')"
            ))),
        }
    }
}

/// Logging section of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// `tracing-subscriber` filter directive (e.g. `itemgate=debug`).
    pub filter: Option<String>,
    /// Output format: `pretty` or `json`.
    pub format: Option<String>,
    /// Optional log file; stderr when unset.
    pub file: Option<PathBuf>,
}

/// Metrics section of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSettings {
    /// Whether to install the Prometheus recorder.
    pub enabled: Option<bool>,
}

/// Observability section of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservabilitySettings {
    /// Logging settings.
    pub logging: Option<LoggingSettings>,
    /// Metrics settings.
    pub metrics: Option<MetricsSettings>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Backend name.
    pub backend: Option<String>,
    /// Data directory.
    pub data_dir: Option<String>,
    /// Observability settings.
    pub observability: Option<ObservabilitySettings>,
}

/// Main configuration for itemgate.
#[derive(Debug, Clone)]
pub struct ItemgateConfig {
    /// Directory holding the `SQLite` database.
    pub data_dir: PathBuf,
    /// Item backend used by the save path.
    pub backend: BackendKind,
    /// Logging and metrics settings (env overrides are applied by
    /// [`crate::observability`]).
    pub observability: ObservabilitySettings,
}

impl Default for ItemgateConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".itemgate"),
            backend: BackendKind::default(),
            observability: ObservabilitySettings::default(),
        }
    }
}

impl ItemgateConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or names an
    /// unknown backend.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid config TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Looks for `itemgate/config.toml` in the platform config directory and
    /// returns defaults if it is missing or unreadable.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(path) = Self::default_config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                Self::default()
            },
        }
    }

    /// Loads configuration from `path` (or the default location) and applies
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file cannot be loaded or an
    /// environment override is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_default(),
        };

        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Returns the default config file path, if a home directory is known.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("itemgate").join("config.toml"))
    }

    /// Applies `ITEMGATE_BACKEND` and `ITEMGATE_DATA_DIR` using `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if `ITEMGATE_BACKEND` names an unknown backend.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("ITEMGATE_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Some(data_dir) = lookup("ITEMGATE_DATA_DIR").filter(|d| !d.is_empty()) {
            self.data_dir = PathBuf::from(data_dir);
        }
        Ok(self)
    }

    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(backend) = file.backend {
            config.backend = backend.parse()?;
        }
        if let Some(data_dir) = file.data_dir {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(observability) = file.observability {
            config.observability = observability;
        }

        Ok(config)
    }

    /// Path of the `SQLite` database file.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE_NAME)
    }

    /// Sets the backend.
    #[must_use]
    pub const fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }
}
