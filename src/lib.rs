//! # Itemgate
//!
//! A guarded write path for content-identified items.
//!
//! Itemgate makes sure that concurrent submissions of identical content never
//! produce duplicate stored items, while submissions of different content run
//! fully in parallel.
//!
//! ## Features
//!
//! - Per-content reservations backed by a sharded concurrent set
//! - Scoped (RAII) release on every exit path, including panics
//! - Pluggable item backends (in-memory, `SQLite`)
//! - Structured logging via `tracing`, Prometheus metrics via `metrics`
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use itemgate::{InMemoryItemBackend, SaveOrchestrator, SaveStatus};
//!
//! let orchestrator = SaveOrchestrator::new(Arc::new(InMemoryItemBackend::new()));
//!
//! let first = orchestrator.save("hello")?;
//! assert_eq!(first.status, SaveStatus::Saved);
//!
//! let second = orchestrator.save("hello")?;
//! assert_eq!(second.status, SaveStatus::DuplicateExists);
//! # Ok::<(), itemgate::Error>(())
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod cli;
pub mod config;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

pub use config::{BackendKind, ItemgateConfig};
pub use models::{Item, ItemId, SaveResult, SaveStatus};
pub use services::{Reservation, ReservationGuard, SaveOrchestrator, create_backend};
pub use storage::{InMemoryItemBackend, ItemBackend, SqliteItemBackend};

/// Error type for itemgate operations.
///
/// Collisions and duplicates are not errors; they are reported through
/// [`SaveResult`]. Errors are reserved for failures the caller cannot
/// simply retry around.
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Unknown backend name, malformed config values |
/// | `OperationFailed` | Backend lookups or inserts fail, I/O errors, telemetry init |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - `SQLite` queries or inserts fail
    /// - A backend rejects an item (constraint violations, injected faults)
    /// - Config or log files cannot be read or created
    /// - Observability is initialized twice
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for itemgate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in seconds.
///
/// Falls back to 0 if the system clock is before the Unix epoch.
#[must_use]
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
