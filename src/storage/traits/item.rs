//! Item backend trait.

use crate::Result;
use crate::models::Item;

/// Trait for item storage backends.
///
/// Backends are the authoritative source of truth for items. They are shared
/// across threads and take `&self`; each implementation brings its own
/// internal locking. Backends do not deduplicate; that is the job of
/// [`crate::SaveOrchestrator`].
pub trait ItemBackend: Send + Sync {
    /// Returns every stored item whose content equals `content` exactly.
    ///
    /// Returns an empty vector when there is none.
    fn find_by_content(&self, content: &str) -> Result<Vec<Item>>;

    /// Durably stores a new item with the given content and returns it with
    /// its assigned id.
    fn persist(&self, content: &str) -> Result<Item>;

    /// Lists all stored items in id order.
    fn list_all(&self) -> Result<Vec<Item>>;

    /// Returns the total number of stored items.
    fn count(&self) -> Result<usize> {
        Ok(self.list_all()?.len())
    }
}
