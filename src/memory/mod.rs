//! Semantic memory: the knowledge base layered over a [`KnowledgeStore`].
//!
//! This module provides:
//! - Embedding text through an optional provider, with an explicit fallback policy
//! - Storing content + embedding pairs under fresh ids
//! - Brute-force cosine ranking over every stored item
//! - The append-only triple log (add, exact-match query, related)
//!
//! Embeddings that did not come from the provider are recorded in the item
//! metadata under [`EMBEDDING_ORIGIN_KEY`].

use crate::agents::event_log::{EventLog, NoopEventLog};
use crate::db::KnowledgeStore;
use crate::rag::{
    placeholder_vector, rank_by_similarity, Embedding, EmbeddingOrigin, EmbeddingProvider,
};
use crate::types::{
    AgentEvent, AppError, KnowledgeItem, KnowledgeTriple, Payload, Result, TripleFilter,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Metadata key recording whether an item's embedding is genuine.
pub const EMBEDDING_ORIGIN_KEY: &str = "embedding_origin";

/// Default number of results for semantic search.
pub const DEFAULT_TOP_K: i64 = 3;

/// What to do when the embedding provider fails or is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Use a random vector of the right length, flagged as a placeholder.
    #[default]
    Placeholder,
    /// Fail the operation with [`AppError::Embedding`].
    Abort,
}

pub struct KnowledgeBase {
    store: Arc<dyn KnowledgeStore>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    dimensions: usize,
    fallback: FallbackPolicy,
    events: Arc<dyn EventLog>,
}

impl KnowledgeBase {
    /// Knowledge base without an embedding provider: every vector is a placeholder.
    pub fn new(store: Arc<dyn KnowledgeStore>, dimensions: usize) -> Self {
        Self {
            store,
            embedder: None,
            dimensions,
            fallback: FallbackPolicy::default(),
            events: Arc::new(NoopEventLog),
        }
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_event_log(mut self, events: Arc<dyn EventLog>) -> Self {
        self.events = events;
        self
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn store(&self) -> &Arc<dyn KnowledgeStore> {
        &self.store
    }

    /// Fails with [`AppError::Configuration`] when the store already holds
    /// vectors of another length than this knowledge base produces.
    async fn ensure_store_dimensions(&self) -> Result<()> {
        match self.store.dimensions().await? {
            Some(stored) if stored != self.dimensions => Err(AppError::Configuration(format!(
                "Store holds {}-dimensional embeddings but the knowledge base is configured for {}",
                stored, self.dimensions
            ))),
            _ => Ok(()),
        }
    }

    fn fall_back(&self, reason: String) -> Result<Embedding> {
        match self.fallback {
            FallbackPolicy::Abort => Err(AppError::Embedding(reason)),
            FallbackPolicy::Placeholder => {
                tracing::warn!(
                    dimensions = self.dimensions,
                    "Using placeholder embedding; similarity against it carries no meaning"
                );
                self.events
                    .record(AgentEvent::new("embedding").with("method", "random"));
                Ok(Embedding {
                    vector: placeholder_vector(self.dimensions),
                    origin: EmbeddingOrigin::Placeholder,
                })
            }
        }
    }

    /// Embed `text`, applying the fallback policy on provider failure or a
    /// vector of the wrong dimensionality.
    pub async fn embed(&self, text: &str) -> Result<Embedding> {
        let Some(embedder) = &self.embedder else {
            return self.fall_back("No embedding provider configured".to_string());
        };

        match embedder.embed(text).await {
            Ok(vector) if vector.len() == self.dimensions => {
                self.events.record(
                    AgentEvent::new("embedding")
                        .with("method", "provider")
                        .with("model", embedder.model_name()),
                );
                Ok(Embedding {
                    vector,
                    origin: EmbeddingOrigin::Provider,
                })
            }
            Ok(vector) => {
                let reason = format!(
                    "Provider returned {} dimensions, store expects {}",
                    vector.len(),
                    self.dimensions
                );
                tracing::warn!("{}", reason);
                self.events
                    .record(AgentEvent::new("embedding_error").with("error", reason.clone()));
                self.fall_back(reason)
            }
            Err(e) => {
                tracing::warn!("Embedding provider failed: {}", e);
                self.events
                    .record(AgentEvent::new("embedding_error").with("error", e.to_string()));
                self.fall_back(e.to_string())
            }
        }
    }

    /// Embed and persist `content`, returning the new item id.
    pub async fn embed_and_store(&self, content: &str, metadata: Option<Payload>) -> Result<String> {
        self.ensure_store_dimensions().await?;
        let embedding = self.embed(content).await?;
        let item_id = format!("item_{}", Uuid::new_v4().simple());

        let mut metadata = metadata.unwrap_or_default();
        metadata.insert(
            EMBEDDING_ORIGIN_KEY.to_string(),
            embedding.origin.as_str().into(),
        );

        let item = KnowledgeItem {
            id: item_id.clone(),
            content: content.to_string(),
            embedding: embedding.vector,
            metadata,
        };
        self.store.insert_item(&item).await?;

        self.events.record(
            AgentEvent::new("embed_and_store")
                .with("item_id", item_id.clone())
                .with("content", content)
                .with(EMBEDDING_ORIGIN_KEY, embedding.origin.as_str()),
        );
        tracing::info!(item_id = %item_id, origin = embedding.origin.as_str(), "Stored knowledge item");

        Ok(item_id)
    }

    /// Top `top_k` items by cosine similarity to `query`, with their scores.
    pub async fn semantic_search_scored(
        &self,
        query: &str,
        top_k: i64,
    ) -> Result<Vec<(KnowledgeItem, f32)>> {
        let mut placeholder_query = false;
        let ranked = if top_k <= 0 {
            Vec::new()
        } else {
            self.ensure_store_dimensions().await?;
            let query_embedding = self.embed(query).await?;
            if query_embedding.is_placeholder() {
                tracing::warn!(query, "Searching with a placeholder query embedding");
                placeholder_query = true;
            }
            let items = self.store.items().await?;
            rank_by_similarity(&query_embedding.vector, items, top_k, |item| {
                item.embedding.as_slice()
            })
        };

        self.events.record(
            AgentEvent::new("semantic_search")
                .with("query", query)
                .with("top_k", top_k)
                .with("returned", ranked.len())
                .with("placeholder_query", placeholder_query),
        );

        Ok(ranked)
    }

    /// Top `top_k` items by cosine similarity to `query`.
    pub async fn semantic_search(&self, query: &str, top_k: i64) -> Result<Vec<KnowledgeItem>> {
        Ok(self
            .semantic_search_scored(query, top_k)
            .await?
            .into_iter()
            .map(|(item, _)| item)
            .collect())
    }

    pub async fn get(&self, id: &str) -> Result<Option<KnowledgeItem>> {
        self.store.get_item(id).await
    }

    pub async fn count(&self) -> Result<usize> {
        self.store.count_items().await
    }

    /// Most recently stored item.
    pub async fn latest(&self) -> Result<Option<KnowledgeItem>> {
        Ok(self.store.items().await?.pop())
    }

    pub async fn add_triple(
        &self,
        subject: &str,
        predicate: &str,
        object: &str,
        metadata: Option<Payload>,
    ) -> Result<()> {
        let triple = KnowledgeTriple::new(subject, predicate, object)
            .with_metadata(metadata.unwrap_or_default());
        self.store.append_triple(&triple).await?;

        self.events.record(
            AgentEvent::new("add_triple")
                .with("subject", subject)
                .with("predicate", predicate)
                .with("object", object),
        );
        Ok(())
    }

    /// Triples matching every given field exactly; `None` matches anything.
    pub async fn query(
        &self,
        subject: Option<&str>,
        predicate: Option<&str>,
        object: Option<&str>,
    ) -> Result<Vec<KnowledgeTriple>> {
        let filter = TripleFilter {
            subject: subject.map(str::to_string),
            predicate: predicate.map(str::to_string),
            object: object.map(str::to_string),
        };
        self.store.query_triples(&filter).await
    }

    /// Triples where `topic` is the subject or the object.
    pub async fn related(&self, topic: &str) -> Result<Vec<KnowledgeTriple>> {
        self.store.related(topic).await
    }
}
