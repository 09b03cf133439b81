//! Backend operation metrics.

use crate::Result;
use std::time::Instant;

/// Times one backend operation and records it when finished.
///
/// Emits `storage_operations_total` and `storage_operation_duration_ms`,
/// labelled by backend, operation and `success`/`error` status.
#[must_use = "an unfinished timer records nothing"]
pub struct OperationTimer {
    backend: &'static str,
    operation: &'static str,
    start: Instant,
}

impl OperationTimer {
    /// Starts timing `operation` on `backend`.
    pub fn start(backend: &'static str, operation: &'static str) -> Self {
        Self {
            backend,
            operation,
            start: Instant::now(),
        }
    }

    /// Records the outcome of the operation and hands the result back.
    pub fn finish<T>(self, result: Result<T>) -> Result<T> {
        let status = if result.is_ok() { "success" } else { "error" };
        let labels = [
            ("backend", self.backend),
            ("operation", self.operation),
            ("status", status),
        ];
        metrics::counter!("storage_operations_total", &labels).increment(1);
        metrics::histogram!("storage_operation_duration_ms", &labels)
            .record(self.start.elapsed().as_secs_f64() * 1000.0);
        result
    }
}
