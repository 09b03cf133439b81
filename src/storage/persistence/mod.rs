//! Item backend implementations.

mod memory;
mod sqlite;

pub use memory::InMemoryItemBackend;
pub use sqlite::SqliteItemBackend;
