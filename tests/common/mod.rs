//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod mocks;

use research_agent::db::InMemoryKnowledgeStore;
use research_agent::memory::KnowledgeBase;
use std::sync::Arc;

/// Knowledge base over a fresh in-memory store with the keyword embedder.
pub fn keyword_knowledge_base() -> KnowledgeBase {
    KnowledgeBase::new(Arc::new(InMemoryKnowledgeStore::new()), mocks::KEYWORDS.len())
        .with_embedder(Arc::new(mocks::KeywordEmbedder))
}
