//! Storage layer.
//!
//! - **Traits**: the [`ItemBackend`] contract the save path depends on
//! - **Persistence**: in-memory and `SQLite` implementations
//! - **Support**: poison-tolerant locking and per-operation metrics

// Dropping the connection guard a few statements early buys nothing here.
#![allow(clippy::significant_drop_tightening)]

mod lock;
mod metrics;
pub mod persistence;
pub mod traits;

pub use persistence::{InMemoryItemBackend, SqliteItemBackend};
pub use traits::ItemBackend;
