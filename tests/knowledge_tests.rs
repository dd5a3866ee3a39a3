//! Knowledge base tests against both store backends.

mod common;

use common::mocks::{FailingEmbedder, KeywordEmbedder, KEYWORDS};
use research_agent::agents::{EventLog, MemoryEventLog};
use research_agent::db::{KnowledgeStore, SqliteKnowledgeStore, StoreProvider};
use research_agent::memory::{FallbackPolicy, KnowledgeBase, EMBEDDING_ORIGIN_KEY};
use research_agent::types::AppError;
use serde_json::json;
use std::sync::Arc;

async fn sqlite_knowledge_base(path: &str) -> KnowledgeBase {
    let store = SqliteKnowledgeStore::new_local(path).await.unwrap();
    KnowledgeBase::new(Arc::new(store), KEYWORDS.len()).with_embedder(Arc::new(KeywordEmbedder))
}

#[tokio::test]
async fn test_sqlite_items_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("knowledge.db");
    let path = path.to_str().unwrap();

    let stored_id = {
        let knowledge = sqlite_knowledge_base(path).await;
        let meta = json!({ "source": "notes" }).as_object().cloned();
        knowledge
            .embed_and_store("Survey of AI papers", meta)
            .await
            .unwrap()
    };

    let reopened = sqlite_knowledge_base(path).await;
    assert_eq!(reopened.count().await.unwrap(), 1);

    let item = reopened.get(&stored_id).await.unwrap().unwrap();
    assert_eq!(item.content, "Survey of AI papers");
    assert_eq!(item.embedding.len(), KEYWORDS.len());
    assert_eq!(item.metadata["source"], "notes");
    assert_eq!(item.metadata[EMBEDDING_ORIGIN_KEY], "provider");
}

#[tokio::test]
async fn test_semantic_search_ranks_by_similarity() {
    let knowledge = common::keyword_knowledge_base();
    let cooking = knowledge
        .embed_and_store("Cooking recipes for pasta", None)
        .await
        .unwrap();
    let papers = knowledge
        .embed_and_store("Top AI papers of the year", None)
        .await
        .unwrap();

    let hits = knowledge.semantic_search("AI papers", 2).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, papers);
    assert_eq!(hits[1].id, cooking);

    let scored = knowledge.semantic_search_scored("recipes", 1).await.unwrap();
    assert_eq!(scored.len(), 1);
    assert_eq!(scored[0].0.id, cooking);
    assert!(scored[0].1 > 0.5);
}

#[tokio::test]
async fn test_semantic_search_edge_cases() {
    let knowledge = common::keyword_knowledge_base();
    assert!(knowledge.semantic_search("AI", 3).await.unwrap().is_empty());

    knowledge.embed_and_store("AI papers", None).await.unwrap();
    assert!(knowledge.semantic_search("AI", 0).await.unwrap().is_empty());
    assert!(knowledge.semantic_search("AI", -2).await.unwrap().is_empty());
    assert_eq!(knowledge.semantic_search("AI", 50).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_equal_scores_keep_insertion_order() {
    let knowledge = common::keyword_knowledge_base();
    let first = knowledge.embed_and_store("AI", None).await.unwrap();
    let second = knowledge.embed_and_store("ai", None).await.unwrap();

    let hits = knowledge.semantic_search("AI", 2).await.unwrap();
    assert_eq!(hits[0].id, first);
    assert_eq!(hits[1].id, second);
}

#[tokio::test]
async fn test_failing_embedder_falls_back_to_placeholder() {
    let events = MemoryEventLog::shared("memory");
    let knowledge = KnowledgeBase::new(StoreProvider::Memory.create_store().await.unwrap(), 8)
        .with_embedder(Arc::new(FailingEmbedder))
        .with_event_log(events.clone());

    let id = knowledge.embed_and_store("anything", None).await.unwrap();
    let item = knowledge.get(&id).await.unwrap().unwrap();
    assert_eq!(item.embedding.len(), 8);
    assert!(item.embedding.iter().all(|v| (0.0..1.0).contains(v)));
    assert_eq!(item.metadata[EMBEDDING_ORIGIN_KEY], "placeholder");

    let names: Vec<String> = events.events().into_iter().map(|e| e.event).collect();
    assert!(names.contains(&"embedding_error".to_string()));
    assert!(names.contains(&"embed_and_store".to_string()));
}

#[tokio::test]
async fn test_abort_policy_stores_nothing() {
    let knowledge = KnowledgeBase::new(StoreProvider::Memory.create_store().await.unwrap(), 8)
        .with_embedder(Arc::new(FailingEmbedder))
        .with_fallback(FallbackPolicy::Abort);

    let err = knowledge.embed_and_store("anything", None).await.unwrap_err();
    assert!(matches!(err, AppError::Embedding(_)));
    assert_eq!(knowledge.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_triples_on_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.db");
    let knowledge = sqlite_knowledge_base(path.to_str().unwrap()).await;

    knowledge
        .add_triple("item_1", "about", "AI papers", None)
        .await
        .unwrap();
    knowledge
        .add_triple("AI papers", "cites", "item_2", json!({ "w": 1 }).as_object().cloned())
        .await
        .unwrap();
    knowledge
        .add_triple("item_3", "about", "cooking", None)
        .await
        .unwrap();

    let about = knowledge.query(None, Some("about"), None).await.unwrap();
    assert_eq!(about.len(), 2);
    assert_eq!(about[0].subject, "item_1");
    assert_eq!(about[1].subject, "item_3");

    let exact = knowledge
        .query(Some("item_1"), Some("about"), Some("AI papers"))
        .await
        .unwrap();
    assert_eq!(exact.len(), 1);

    assert_eq!(knowledge.query(None, None, None).await.unwrap().len(), 3);
    assert!(knowledge.query(Some("AI"), None, None).await.unwrap().is_empty());

    let related = knowledge.related("AI papers").await.unwrap();
    assert_eq!(related.len(), 2);
    assert_eq!(related[1].metadata["w"], 1);
    assert!(knowledge.related("nothing").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_knowledge_bases_of_different_dimensions_cannot_share_a_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("knowledge.db");
    let store = StoreProvider::Sqlite {
        path: path.to_string_lossy().to_string(),
    }
    .create_store()
    .await
    .unwrap();

    let four = KnowledgeBase::new(store.clone(), 4);
    let six = KnowledgeBase::new(store.clone(), 6);

    four.embed_and_store("four-dimensional digest", None)
        .await
        .unwrap();

    let err = six.embed_and_store("six-dimensional digest", None).await.unwrap_err();
    assert!(matches!(err, AppError::Configuration(_)));
    let err = six.semantic_search("digest", 1).await.unwrap_err();
    assert!(matches!(err, AppError::Configuration(_)));

    assert_eq!(store.count_items().await.unwrap(), 1);
    assert_eq!(store.dimensions().await.unwrap(), Some(4));
    assert_eq!(four.semantic_search("digest", 1).await.unwrap().len(), 1);
}
