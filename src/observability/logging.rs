//! Structured logging configuration.

use crate::config::LoggingSettings;
use crate::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;

/// Default filter directive when nothing else is configured.
pub const DEFAULT_FILTER: &str = "itemgate=info";

/// Filter directive used with `--verbose`.
pub const VERBOSE_FILTER: &str = "itemgate=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(Error::InvalidInput(format!(
                "unknown log format '{other}' (expected 'pretty' or 'json')"
            ))),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
    /// Log file; stderr when `None`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Builds logging configuration from config settings with
    /// `ITEMGATE_LOG*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured or environment log format is
    /// neither `pretty` nor `json`.
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Result<Self> {
        Self::from_settings_with_env(settings, verbose, |key| std::env::var(key).ok())
    }

    /// Same as [`from_settings`](Self::from_settings) with an explicit
    /// environment lookup.
    ///
    /// # Errors
    ///
    /// See [`from_settings`](Self::from_settings).
    pub fn from_settings_with_env<F>(
        settings: Option<&LoggingSettings>,
        verbose: bool,
        lookup: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(settings) = settings {
            if let Some(filter) = &settings.filter {
                config.filter.clone_from(filter);
            }
            if let Some(format) = &settings.format {
                config.format = format.parse()?;
            }
            config.file.clone_from(&settings.file);
        }

        if verbose {
            config.filter = VERBOSE_FILTER.to_string();
        }

        // Explicit env always wins, even over --verbose.
        if let Some(filter) = lookup("ITEMGATE_LOG").filter(|f| !f.trim().is_empty()) {
            config.filter = filter;
        }
        if let Some(format) = lookup("ITEMGATE_LOG_FORMAT") {
            config.format = format.parse()?;
        }
        if let Some(file) = lookup("ITEMGATE_LOG_FILE").filter(|f| !f.is_empty()) {
            config.file = Some(PathBuf::from(file));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::from_settings_with_env(None, false, no_env).unwrap();
        assert_eq!(config.filter, DEFAULT_FILTER);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file.is_none());
    }

    #[test]
    fn test_verbose_overrides_settings() {
        let settings = LoggingSettings {
            filter: Some("itemgate=warn".to_string()),
            format: Some("JSON".to_string()),
            file: None,
        };
        let config = LoggingConfig::from_settings_with_env(Some(&settings), true, no_env).unwrap();
        assert_eq!(config.filter, VERBOSE_FILTER);
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_env_overrides_everything() {
        let config = LoggingConfig::from_settings_with_env(None, true, |key| match key {
            "ITEMGATE_LOG" => Some("itemgate=trace".to_string()),
            "ITEMGATE_LOG_FORMAT" => Some("json".to_string()),
            "ITEMGATE_LOG_FILE" => Some("/tmp/itemgate.log".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.filter, "itemgate=trace");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/itemgate.log")));
    }

    #[test_case("json", LogFormat::Json; "json")]
    #[test_case(" Pretty ", LogFormat::Pretty; "pretty padded")]
    fn test_log_format_parse(input: &str, expected: LogFormat) {
        assert_eq!(input.parse::<LogFormat>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_log_format_is_rejected() {
        let settings = LoggingSettings {
            filter: None,
            format: Some("jsno".to_string()),
            file: None,
        };
        let err = LoggingConfig::from_settings_with_env(Some(&settings), false, no_env).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref msg) if msg.contains("jsno")));

        let from_env = LoggingConfig::from_settings_with_env(None, false, |key| {
            (key == "ITEMGATE_LOG_FORMAT").then(|| "xml".to_string())
        });
        assert!(from_env.is_err());
    }
}
