//! Save result types.
//!
//! Collisions and duplicates are ordinary outcomes of the save path, not
//! errors. They are reported here so callers can decide whether to retry.

use super::{Item, ItemId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    /// The item was persisted and received an id.
    Saved,
    /// Another in-flight save holds the reservation for this content.
    Collision,
    /// An item with this content is already stored.
    DuplicateExists,
}

impl SaveStatus {
    /// Returns the status as a string slice (used for metric labels).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::Collision => "collision",
            Self::DuplicateExists => "duplicate_exists",
        }
    }
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result returned to callers of [`crate::SaveOrchestrator::save`].
///
/// # Example
///
/// ```rust
/// use itemgate::{SaveResult, SaveStatus};
///
/// let result = SaveResult::collision("x");
/// assert!(!result.success);
/// assert_eq!(result.status, SaveStatus::Collision);
/// assert!(result.message.contains("x"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResult {
    /// What happened.
    pub status: SaveStatus,
    /// Whether the item was persisted. Always `status == Saved`.
    pub success: bool,
    /// Human-readable description, including the offending content on failure.
    pub message: String,
    /// Id of the newly persisted item, only set on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<ItemId>,
}

impl SaveResult {
    /// Creates a success result for a freshly persisted item.
    #[must_use]
    pub fn saved(item: &Item) -> Self {
        Self {
            status: SaveStatus::Saved,
            success: true,
            message: format!(
                "Item with content {} saved with id {}",
                item.content, item.id
            ),
            item_id: Some(item.id),
        }
    }

    /// Creates a failure result for content whose reservation is already held.
    #[must_use]
    pub fn collision(content: &str) -> Self {
        Self {
            status: SaveStatus::Collision,
            success: false,
            message: format!(
                "Another request is processing the item with content {content}."
            ),
            item_id: None,
        }
    }

    /// Creates a failure result for content that is already stored.
    #[must_use]
    pub fn duplicate(content: &str) -> Self {
        Self {
            status: SaveStatus::DuplicateExists,
            success: false,
            message: format!("Item with content {content} already exists."),
            item_id: None,
        }
    }
}

impl fmt::Display for SaveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
