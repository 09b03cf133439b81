//! Data models for itemgate.
//!
//! Items are owned by the storage backends; save results are what callers
//! of the save path get back.

mod item;
mod save;

pub use item::{Item, ItemId};
pub use save::{SaveResult, SaveStatus};
