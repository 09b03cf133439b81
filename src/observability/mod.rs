//! Logging and metrics setup.
//!
//! The library only emits `tracing` events and `metrics` samples; nothing is
//! recorded until the binary (or an embedding application) calls [`init`].

mod logging;
mod metrics;

pub use logging::{DEFAULT_FILTER, LogFormat, LoggingConfig, VERBOSE_FILTER};
pub use self::metrics::{MetricsConfig, install_prometheus};

use crate::config::ObservabilitySettings;
use crate::{Error, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Full observability configuration.
#[derive(Debug, Clone, Default)]
pub struct ObservabilityConfig {
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Metrics configuration.
    pub metrics: MetricsConfig,
}

/// Options supplied by the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct InitOptions {
    /// Whether `--verbose` was given.
    pub verbose: bool,
}

/// Handle for the installed telemetry components.
pub struct ObservabilityHandle {
    prometheus: Option<PrometheusHandle>,
}

impl ObservabilityHandle {
    /// Renders the current metrics snapshot in Prometheus text format.
    ///
    /// Returns `None` if metrics are disabled.
    #[must_use]
    pub fn render_metrics(&self) -> Option<String> {
        self.prometheus.as_ref().map(PrometheusHandle::render)
    }

    /// Returns whether a metrics recorder is installed.
    #[must_use]
    pub const fn metrics_enabled(&self) -> bool {
        self.prometheus.is_some()
    }
}

impl std::fmt::Debug for ObservabilityHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservabilityHandle")
            .field("metrics_enabled", &self.metrics_enabled())
            .finish()
    }
}

static OBSERVABILITY_INIT: OnceLock<()> = OnceLock::new();

/// Builds the observability configuration from config settings, CLI options
/// and `ITEMGATE_*` environment overrides.
///
/// # Errors
///
/// Returns an error if a logging setting is invalid.
pub fn build_config(
    settings: Option<&ObservabilitySettings>,
    options: InitOptions,
) -> Result<ObservabilityConfig> {
    Ok(ObservabilityConfig {
        logging: LoggingConfig::from_settings(
            settings.and_then(|cfg| cfg.logging.as_ref()),
            options.verbose,
        )?,
        metrics: MetricsConfig::from_settings(settings.and_then(|cfg| cfg.metrics.as_ref())),
    })
}

/// Installs the global `tracing` subscriber and, if enabled, the Prometheus
/// recorder.
///
/// # Errors
///
/// Returns an error if observability has already been initialized, the
/// filter directive is invalid, or the log file cannot be opened.
pub fn init(config: ObservabilityConfig) -> Result<ObservabilityHandle> {
    if OBSERVABILITY_INIT.get().is_some() {
        return Err(already_initialized());
    }

    let filter = EnvFilter::try_new(&config.logging.filter).map_err(|e| {
        Error::InvalidInput(format!("log filter '{}': {e}", config.logging.filter))
    })?;

    let (writer, ansi) = match &config.logging.file {
        Some(path) => (BoxMakeWriter::new(open_log_file(path)?), false),
        None => (BoxMakeWriter::new(io::stderr), true),
    };

    let installed = match config.logging.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true)
                    .with_thread_names(true),
            )
            .with(filter)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(writer)
                    .with_ansi(ansi)
                    .with_target(true)
                    .with_thread_names(true),
            )
            .with(filter)
            .try_init(),
    };
    installed.map_err(|e| Error::OperationFailed {
        operation: "observability_init".to_string(),
        cause: e.to_string(),
    })?;

    // Only after the subscriber is in place, so a failed init leaves no
    // global recorder behind.
    let prometheus = install_prometheus(&config.metrics)?;

    OBSERVABILITY_INIT.set(()).map_err(|()| already_initialized())?;

    tracing::debug!(
        filter = %config.logging.filter,
        metrics = prometheus.is_some(),
        "Observability initialized"
    );

    Ok(ObservabilityHandle { prometheus })
}

fn already_initialized() -> Error {
    Error::OperationFailed {
        operation: "observability_init".to_string(),
        cause: "observability already initialized".to_string(),
    }
}

/// Appending log file shared by all writer handles.
#[derive(Clone)]
struct LogFileWriter {
    file: Arc<Mutex<File>>,
}

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?
            .flush()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogFileWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn open_log_file(path: &Path) -> Result<LogFileWriter> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
            operation: "create_log_dir".to_string(),
            cause: format!("{}: {e}", parent.display()),
        })?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::OperationFailed {
            operation: "open_log_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

    Ok(LogFileWriter {
        file: Arc::new(Mutex::new(file)),
    })
}
