//! Backend factory.
//!
//! Centralizes item backend creation so the binary and tests build backends
//! the same way from an [`ItemgateConfig`].

use crate::Result;
use crate::config::{BackendKind, ItemgateConfig};
use crate::storage::{InMemoryItemBackend, ItemBackend, SqliteItemBackend};
use std::sync::Arc;

/// Creates the item backend selected by `config`.
///
/// # Errors
///
/// Returns an error if the `SQLite` database cannot be opened or initialized.
///
/// # Example
///
/// ```rust
/// use itemgate::{BackendKind, ItemgateConfig, create_backend};
///
/// let config = ItemgateConfig::new().with_backend(BackendKind::Memory);
/// let backend = create_backend(&config)?;
/// assert_eq!(backend.count()?, 0);
/// # Ok::<(), itemgate::Error>(())
/// ```
pub fn create_backend(config: &ItemgateConfig) -> Result<Arc<dyn ItemBackend>> {
    match config.backend {
        BackendKind::Memory => {
            tracing::debug!("Using in-memory item backend");
            Ok(Arc::new(InMemoryItemBackend::new()))
        },
        BackendKind::Sqlite => {
            let path = config.database_path();
            tracing::debug!(path = %path.display(), "Using SQLite item backend");
            Ok(Arc::new(SqliteItemBackend::new(path)?))
        },
    }
}
