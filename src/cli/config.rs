//! `config` command.

use super::write_error;
use crate::Result;
use crate::config::ItemgateConfig;
use crate::observability::{LoggingConfig, MetricsConfig};
use std::io::Write;

/// Shows the effective configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigCommand;

impl ConfigCommand {
    /// Creates a config command.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Writes `config` together with the resolved logging and metrics
    /// settings to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    #[allow(clippy::unused_self)]
    pub fn show<W: Write>(
        &self,
        config: &ItemgateConfig,
        logging: &LoggingConfig,
        metrics: &MetricsConfig,
        out: &mut W,
    ) -> Result<()> {
        let log_file = logging
            .file
            .as_ref()
            .map_or_else(|| "stderr".to_string(), |p| p.display().to_string());

        writeln!(out, "Itemgate Configuration")
            .and_then(|()| writeln!(out, "======================"))
            .and_then(|()| writeln!(out))
            .and_then(|()| writeln!(out, "backend:     {}", config.backend))
            .and_then(|()| writeln!(out, "data_dir:    {}", config.data_dir.display()))
            .and_then(|()| writeln!(out, "database:    {}", config.database_path().display()))
            .and_then(|()| writeln!(out, "log filter:  {}", logging.filter))
            .and_then(|()| writeln!(out, "log format:  {:?}", logging.format))
            .and_then(|()| writeln!(out, "log output:  {log_file}"))
            .and_then(|()| writeln!(out, "metrics:     {}", metrics.enabled))
            .map_err(|e| write_error(&e))
    }
}
