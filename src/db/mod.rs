//! Knowledge persistence.
//!
//! This module provides storage for knowledge items (content + embedding)
//! and the append-only triple log:
//! - **SQLite** via libsql: durable file-backed store (or `:memory:`)
//! - **In-memory**: ephemeral store for tests and throwaway runs

pub mod in_memory;
pub mod sqlite;
pub mod traits;

// Re-exports
pub use in_memory::InMemoryKnowledgeStore;
pub use sqlite::SqliteKnowledgeStore;
pub use traits::{KnowledgeStore, StoreProvider};
