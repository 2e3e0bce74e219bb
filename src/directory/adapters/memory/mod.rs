//! In-memory directory storage.

mod directory_store;

pub use directory_store::InMemoryDirectoryStore;
