//! In-memory adapter for task lifecycle persistence.

mod store;

pub use store::InMemoryStore;
