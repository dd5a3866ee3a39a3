//! Knowledge store abstraction
//!
//! This module provides the `KnowledgeStore` trait that abstracts over the
//! persistence backends holding knowledge items and triples (in-memory,
//! file-based SQLite via libsql).
//!
//! # Example
//!
//! ```rust,ignore
//! use research_agent::db::StoreProvider;
//!
//! // Ephemeral store (default for tests)
//! let store = StoreProvider::Memory.create_store().await?;
//!
//! // File-based SQLite
//! let store = StoreProvider::Sqlite { path: "data/knowledge.db".into() }.create_store().await?;
//! ```

use crate::types::{AppError, KnowledgeItem, KnowledgeTriple, Result, TripleFilter};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Store provider configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreProvider {
    /// In-process store (ephemeral, lost on exit)
    #[default]
    Memory,
    /// File-based SQLite database through libsql
    Sqlite {
        /// Path to the SQLite database file (`:memory:` for an in-memory database)
        path: String,
    },
}

impl StoreProvider {
    /// Open the store described by this provider.
    pub async fn create_store(&self) -> Result<Arc<dyn KnowledgeStore>> {
        match self {
            StoreProvider::Memory => Ok(Arc::new(super::in_memory::InMemoryKnowledgeStore::new())),
            StoreProvider::Sqlite { path } => {
                let store = super::sqlite::SqliteKnowledgeStore::new_local(path).await?;
                Ok(Arc::new(store))
            }
        }
    }
}

/// Rejects `item` unless its embedding has `stored` dimensions.
pub(crate) fn check_dimensions(stored: usize, item: &KnowledgeItem) -> Result<()> {
    if item.embedding.len() == stored {
        return Ok(());
    }
    Err(AppError::InvalidInput(format!(
        "Knowledge item '{}' has {} dimensions, store holds {}",
        item.id,
        item.embedding.len(),
        stored
    )))
}

/// Persistence operations needed by the knowledge base.
///
/// Items are write-once: there is no update or delete path. `items` must
/// return rows in insertion order so that ranking ties stay stable.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Name of the backend, for logs and status output.
    fn backend_name(&self) -> &'static str;

    /// Persist a new item. Fails with [`AppError::Database`] if the id is
    /// already present and with [`AppError::InvalidInput`] if its embedding
    /// length differs from the stored items'.
    ///
    /// [`AppError::Database`]: crate::types::AppError::Database
    /// [`AppError::InvalidInput`]: crate::types::AppError::InvalidInput
    async fn insert_item(&self, item: &KnowledgeItem) -> Result<()>;

    /// Every stored item, in insertion order.
    async fn items(&self) -> Result<Vec<KnowledgeItem>>;

    /// Fetch one item by id.
    async fn get_item(&self, id: &str) -> Result<Option<KnowledgeItem>>;

    /// Number of stored items.
    async fn count_items(&self) -> Result<usize>;

    /// Embedding length shared by every stored item, `None` while empty.
    async fn dimensions(&self) -> Result<Option<usize>>;

    /// Append a triple to the log.
    async fn append_triple(&self, triple: &KnowledgeTriple) -> Result<()>;

    /// Triples matching every set field of the filter, in insertion order.
    async fn query_triples(&self, filter: &TripleFilter) -> Result<Vec<KnowledgeTriple>>;

    /// Triples where `topic` appears as subject or object.
    async fn related(&self, topic: &str) -> Result<Vec<KnowledgeTriple>>;
}
