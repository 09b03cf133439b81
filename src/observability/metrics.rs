//! Prometheus metrics.
//!
//! Metrics are recorded through the `metrics` facade everywhere in the crate.
//! Without an installed recorder they are no-ops; [`install_prometheus`]
//! installs an in-process Prometheus recorder whose snapshot can be rendered
//! on demand.

use crate::config::MetricsSettings;
use crate::{Error, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Metrics configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsConfig {
    /// Whether to install the Prometheus recorder.
    pub enabled: bool,
}

impl MetricsConfig {
    /// Builds metrics configuration from config settings with the
    /// `ITEMGATE_METRICS_ENABLED` environment override.
    #[must_use]
    pub fn from_settings(settings: Option<&MetricsSettings>) -> Self {
        Self::from_settings_with_env(settings, |key| std::env::var(key).ok())
    }

    /// Same as [`from_settings`](Self::from_settings) with an explicit
    /// environment lookup.
    #[must_use]
    pub fn from_settings_with_env<F>(settings: Option<&MetricsSettings>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            enabled: settings.and_then(|s| s.enabled).unwrap_or(false),
        };

        if let Some(enabled) = lookup("ITEMGATE_METRICS_ENABLED").and_then(|v| parse_bool(&v)) {
            config.enabled = enabled;
        }

        config
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Installs the Prometheus recorder as the global `metrics` recorder.
///
/// Returns `None` when metrics are disabled.
///
/// # Errors
///
/// Returns an error if a global recorder is already installed.
pub fn install_prometheus(config: &MetricsConfig) -> Result<Option<PrometheusHandle>> {
    if !config.enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::OperationFailed {
            operation: "metrics_recorder_install".to_string(),
            cause: e.to_string(),
        })?;

    describe_metrics();
    Ok(Some(handle))
}

fn describe_metrics() {
    metrics::describe_counter!("item_save_total", "Save attempts by outcome status");
    metrics::describe_histogram!(
        "item_save_duration_ms",
        metrics::Unit::Milliseconds,
        "Save latency by outcome status"
    );
    metrics::describe_gauge!(
        "item_reservations_in_flight",
        "Content values currently reserved by an in-flight save"
    );
    metrics::describe_counter!("storage_operations_total", "Backend operations by status");
    metrics::describe_histogram!(
        "storage_operation_duration_ms",
        metrics::Unit::Milliseconds,
        "Backend operation latency"
    );
}
