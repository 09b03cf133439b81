//! In-memory item backend.
//!
//! Items live in a process-local vector. Useful for tests, demos, and as a
//! stand-in for a slow external store via [`InMemoryItemBackend::with_persist_delay`].

use crate::models::{Item, ItemId};
use crate::storage::lock::acquire_lock;
use crate::storage::metrics::OperationTimer;
use crate::storage::traits::ItemBackend;
use crate::{Result, current_timestamp};
use std::sync::Mutex;
use std::time::Duration;
use tracing::instrument;

/// In-memory item backend.
///
/// Ids are assigned sequentially starting at 1.
#[derive(Debug, Default)]
pub struct InMemoryItemBackend {
    items: Mutex<Vec<Item>>,
    persist_delay: Option<Duration>,
}

impl InMemoryItemBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with the given contents, in order.
    #[must_use]
    pub fn with_items<I, S>(contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let now = current_timestamp();
        let items = contents
            .into_iter()
            .zip(1_i64..)
            .map(|(content, id)| Item::new(ItemId::new(id), content, now))
            .collect();

        Self {
            items: Mutex::new(items),
            persist_delay: None,
        }
    }

    /// Makes every `persist` call sleep for `delay` before storing.
    ///
    /// The sleep happens outside the internal lock, so concurrent persists
    /// of different content overlap just like they would against a real store.
    #[must_use]
    pub const fn with_persist_delay(mut self, delay: Duration) -> Self {
        self.persist_delay = Some(delay);
        self
    }
}

impl ItemBackend for InMemoryItemBackend {
    #[instrument(skip(self, content), fields(operation = "find_by_content", backend = "memory", content_length = content.len()))]
    fn find_by_content(&self, content: &str) -> Result<Vec<Item>> {
        let timer = OperationTimer::start("memory", "find_by_content");
        let found = acquire_lock(&self.items)
            .iter()
            .filter(|item| item.content == content)
            .cloned()
            .collect();
        timer.finish(Ok(found))
    }

    #[instrument(skip(self, content), fields(operation = "persist", backend = "memory", content_length = content.len()))]
    fn persist(&self, content: &str) -> Result<Item> {
        let timer = OperationTimer::start("memory", "persist");
        if let Some(delay) = self.persist_delay {
            std::thread::sleep(delay);
        }

        let item = {
            let mut items = acquire_lock(&self.items);
            let next_id = items.last().map_or(1, |last| last.id.get() + 1);
            let item = Item::new(ItemId::new(next_id), content, current_timestamp());
            items.push(item.clone());
            item
        };

        tracing::debug!(item.id = %item.id, "Persisted item");
        timer.finish(Ok(item))
    }

    #[instrument(skip(self), fields(operation = "list_all", backend = "memory"))]
    fn list_all(&self) -> Result<Vec<Item>> {
        let timer = OperationTimer::start("memory", "list_all");
        let items = acquire_lock(&self.items).clone();
        timer.finish(Ok(items))
    }

    fn count(&self) -> Result<usize> {
        Ok(acquire_lock(&self.items).len())
    }
}
