//! Item types and identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned to an item by the backend that persisted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(i64);

impl ItemId {
    /// Creates a new item ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A stored item.
///
/// Items are created only by [`crate::ItemBackend::persist`]; the save path
/// never mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Identifier assigned at persistence time.
    pub id: ItemId,
    /// The content value used for deduplication.
    pub content: String,
    /// Creation timestamp (Unix epoch seconds).
    pub created_at: u64,
}

impl Item {
    /// Creates a new item.
    #[must_use]
    pub fn new(id: ItemId, content: impl Into<String>, created_at: u64) -> Self {
        Self {
            id,
            content: content.into(),
            created_at,
        }
    }
}
