//! Storage backend traits.

mod item;

pub use item::ItemBackend;
