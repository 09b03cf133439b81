//! Guarded save path.
//!
//! [`SaveOrchestrator`] combines a [`ReservationGuard`] with an
//! [`ItemBackend`]:
//!
//! ```text
//! save(content)
//!   ├── reserve(content) ── taken ──────────────▶ Collision
//!   └── held
//!        ├── find_by_content ── non-empty ─────▶ DuplicateExists
//!        └── persist ── ok ────────────────────▶ Saved { id }
//!                    └─ err ───────────────────▶ Err(OperationFailed)
//!   (reservation released on every path above)
//! ```
//!
//! The reservation is taken before the durable existence check so that two
//! concurrent saves of the same content cannot both pass it. The existence
//! check still catches items written before, or outside, this process.

use crate::Result;
use crate::models::{Item, SaveResult};
use crate::services::reservation::ReservationGuard;
use crate::storage::traits::ItemBackend;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Deduplicating save path over an injected item backend.
///
/// Share one orchestrator (e.g. behind an `Arc`) between all threads that
/// save into the same backend; reservations are local to the instance.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use itemgate::{InMemoryItemBackend, SaveOrchestrator};
///
/// let orchestrator = SaveOrchestrator::new(Arc::new(InMemoryItemBackend::new()));
/// let result = orchestrator.save("report-2024.pdf")?;
/// assert!(result.success);
/// assert_eq!(orchestrator.list_all()?.len(), 1);
/// # Ok::<(), itemgate::Error>(())
/// ```
pub struct SaveOrchestrator {
    backend: Arc<dyn ItemBackend>,
    reservations: ReservationGuard,
}

impl SaveOrchestrator {
    /// Creates an orchestrator over `backend`.
    #[must_use]
    pub fn new(backend: Arc<dyn ItemBackend>) -> Self {
        Self {
            backend,
            reservations: ReservationGuard::new(),
        }
    }

    /// Saves `content` unless it is already stored or being saved right now.
    ///
    /// Never waits for a competing save: a concurrent save of the same
    /// content is rejected immediately with [`crate::SaveStatus::Collision`].
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the existence lookup or the insert
    /// fails. The reservation is released before the error reaches the
    /// caller.
    #[instrument(
        skip(self, content),
        fields(operation = "save_item", content_length = content.len())
    )]
    pub fn save(&self, content: &str) -> Result<SaveResult> {
        let start = Instant::now();

        let result = match self.reservations.reserve(content.to_string()) {
            // `_reservation` lives until the end of this arm.
            Some(_reservation) => self.save_reserved(content),
            None => {
                tracing::debug!("Save rejected, content already reserved");
                Ok(SaveResult::collision(content))
            },
        };

        let status = match &result {
            Ok(saved) => saved.status.as_str(),
            Err(_) => "error",
        };
        metrics::counter!("item_save_total", "status" => status).increment(1);
        metrics::histogram!("item_save_duration_ms", "status" => status)
            .record(start.elapsed().as_secs_f64() * 1000.0);

        result
    }

    /// Runs the existence check and insert while the caller holds the reservation.
    fn save_reserved(&self, content: &str) -> Result<SaveResult> {
        let existing = self.backend.find_by_content(content)?;
        if let Some(first) = existing.first() {
            tracing::debug!(
                existing.id = %first.id,
                existing.count = existing.len(),
                "Save rejected, content already stored"
            );
            return Ok(SaveResult::duplicate(content));
        }

        let item = self.backend.persist(content).inspect_err(|e| {
            tracing::warn!(error = %e, "Persisting item failed");
        })?;

        tracing::info!(item.id = %item.id, "Item saved");
        Ok(SaveResult::saved(&item))
    }

    /// Lists all stored items. Plain passthrough to the backend.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if listing fails.
    pub fn list_all(&self) -> Result<Vec<Item>> {
        self.backend.list_all()
    }

    /// Number of saves currently holding a reservation.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.reservations.in_flight()
    }

    /// Returns whether a save of `content` is currently in flight.
    #[must_use]
    pub fn is_in_flight(&self, content: &str) -> bool {
        self.reservations.is_reserved(content)
    }
}

impl std::fmt::Debug for SaveOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveOrchestrator")
            .field("reservations", &self.reservations)
            .finish_non_exhaustive()
    }
}
