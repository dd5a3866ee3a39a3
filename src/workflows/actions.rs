//! One-shot research actions outside the scripted workflow: research a
//! topic, recall from memory, check watched topics, suggest a next step.

use super::engine::Orchestrator;
use crate::types::{KnowledgeItem, Payload, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Topic used by [`Orchestrator::suggest_topic`] when the latest item has none.
pub const DEFAULT_SUGGESTED_TOPIC: &str = "AI research";

/// Outcome of [`Orchestrator::research_topic`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicResearch {
    pub topic: String,
    pub digest: String,
    pub memory_item_id: String,
    pub source_count: usize,
}

/// Latest hit for one watched topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchReport {
    pub topic: String,
    /// Title of the first search result, `None` when nothing came back
    pub latest: Option<String>,
}

fn payload(value: serde_json::Value) -> Option<Payload> {
    value.as_object().cloned()
}

impl Orchestrator {
    /// Search the web for `topic`, store the digest, and record a
    /// `researched_academic` triple from the topic to the digest.
    pub async fn research_topic(&self, topic: &str, top_k: usize) -> Result<TopicResearch> {
        let sources = self.researcher().web_search(topic, top_k).await;
        let digest = self.researcher().synthesize_digest(&sources);

        let memory = self.memory();
        let memory_item_id = memory
            .embed_and_store(&digest, payload(json!({ "source": "researcher", "topic": topic })))
            .await?;
        memory
            .add_triple(
                topic,
                "researched_academic",
                &digest,
                payload(json!({ "source": "openalex" })),
            )
            .await?;

        tracing::info!(topic, item_id = %memory_item_id, sources = sources.len(), "Researched topic");
        Ok(TopicResearch {
            topic: topic.to_string(),
            digest,
            memory_item_id,
            source_count: sources.len(),
        })
    }

    /// Best semantic match for `query`. A hit is recorded as a `recalled`
    /// triple from the query to the recalled content.
    pub async fn recall(&self, query: &str) -> Result<Option<KnowledgeItem>> {
        let memory = self.memory();
        let Some(item) = memory.semantic_search(query, 1).await?.into_iter().next() else {
            return Ok(None);
        };

        memory
            .add_triple(query, "recalled", &item.content, payload(json!({ "action": "recall" })))
            .await?;
        Ok(Some(item))
    }

    /// Title of the newest web result for each topic, in order.
    pub async fn check_watchlist(&self, topics: &[String]) -> Vec<WatchReport> {
        let mut reports = Vec::with_capacity(topics.len());
        for topic in topics {
            let latest = self
                .researcher()
                .web_search(topic, 1)
                .await
                .into_iter()
                .next()
                .map(|hit| hit.title);
            reports.push(WatchReport {
                topic: topic.clone(),
                latest,
            });
        }
        reports
    }

    /// Topic of the most recently stored item, or `None` with an empty store.
    pub async fn suggest_topic(&self) -> Result<Option<String>> {
        let latest = self.memory().knowledge().latest().await?;
        Ok(latest.map(|item| {
            item.metadata
                .get("topic")
                .and_then(|topic| topic.as_str())
                .filter(|topic| !topic.is_empty())
                .unwrap_or(DEFAULT_SUGGESTED_TOPIC)
                .to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::MemoryAgent;
    use crate::db::InMemoryKnowledgeStore;
    use crate::memory::KnowledgeBase;
    use std::sync::Arc;

    fn orchestrator() -> Orchestrator {
        let knowledge = KnowledgeBase::new(Arc::new(InMemoryKnowledgeStore::new()), 8);
        Orchestrator::new(MemoryAgent::new(knowledge))
    }

    #[tokio::test]
    async fn test_research_topic_stores_digest_and_triple() {
        let orchestrator = orchestrator();
        let research = orchestrator.research_topic("graph networks", 2).await.unwrap();

        assert_eq!(research.source_count, 2);
        assert!(research.digest.starts_with("Result 1: Stub result"));

        let memory = orchestrator.memory();
        let item = memory
            .knowledge()
            .get(&research.memory_item_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.metadata["source"], "researcher");
        assert_eq!(item.metadata["topic"], "graph networks");

        let triples = memory
            .query(Some("graph networks"), Some("researched_academic"), None)
            .await
            .unwrap();
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].object, research.digest);
        assert_eq!(triples[0].metadata["source"], "openalex");
    }

    #[tokio::test]
    async fn test_recall_records_triple_only_on_hit() {
        let orchestrator = orchestrator();
        assert!(orchestrator.recall("anything").await.unwrap().is_none());
        assert!(orchestrator.memory().query(None, Some("recalled"), None).await.unwrap().is_empty());

        orchestrator
            .memory()
            .embed_and_store("Residual networks", None)
            .await
            .unwrap();
        let item = orchestrator.recall("resnets").await.unwrap().unwrap();
        assert_eq!(item.content, "Residual networks");

        let recalled = orchestrator.memory().query(Some("resnets"), Some("recalled"), None).await.unwrap();
        assert_eq!(recalled.len(), 1);
        assert_eq!(recalled[0].object, "Residual networks");
        assert_eq!(recalled[0].metadata["action"], "recall");
    }

    #[tokio::test]
    async fn test_suggest_topic_uses_latest_item() {
        let orchestrator = orchestrator();
        assert_eq!(orchestrator.suggest_topic().await.unwrap(), None);

        let memory = orchestrator.memory();
        memory
            .embed_and_store("first", payload(json!({ "topic": "diffusion" })))
            .await
            .unwrap();
        memory
            .embed_and_store("second", payload(json!({ "topic": "graphs" })))
            .await
            .unwrap();
        assert_eq!(orchestrator.suggest_topic().await.unwrap().as_deref(), Some("graphs"));

        memory.embed_and_store("untagged", None).await.unwrap();
        assert_eq!(
            orchestrator.suggest_topic().await.unwrap().as_deref(),
            Some(DEFAULT_SUGGESTED_TOPIC)
        );
    }

    #[tokio::test]
    async fn test_check_watchlist_reports_first_title() {
        let orchestrator = orchestrator();
        let reports = orchestrator
            .check_watchlist(&["transformers".to_string(), "diffusion".to_string()])
            .await;
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].topic, "transformers");
        assert_eq!(reports[1].latest.as_deref(), Some("Result 1"));
    }
}
