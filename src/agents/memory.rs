//! Memory agent: the agent face of the [`KnowledgeBase`].

use super::event_log::{EventLog, MemoryEventLog};
use super::{message_sent, task_received, Agent, AgentStatus};
use crate::memory::KnowledgeBase;
use crate::types::{AgentEvent, AgentRole, KnowledgeItem, KnowledgeTriple, Message, Payload, Result, Task};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub struct MemoryAgent {
    knowledge: KnowledgeBase,
    events: Arc<dyn EventLog>,
}

impl MemoryAgent {
    /// Wrap `knowledge`, routing its events into this agent's log.
    pub fn new(knowledge: KnowledgeBase) -> Self {
        Self::with_event_log(knowledge, MemoryEventLog::shared(AgentRole::Memory.as_str()))
    }

    pub fn with_event_log(knowledge: KnowledgeBase, events: Arc<dyn EventLog>) -> Self {
        Self {
            knowledge: knowledge.with_event_log(events.clone()),
            events,
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub async fn embed_and_store(&self, content: &str, metadata: Option<Payload>) -> Result<String> {
        self.knowledge.embed_and_store(content, metadata).await
    }

    pub async fn semantic_search(&self, query: &str, top_k: i64) -> Result<Vec<KnowledgeItem>> {
        self.knowledge.semantic_search(query, top_k).await
    }

    pub async fn add_triple(
        &self,
        subject: &str,
        predicate: &str,
        object: &str,
        metadata: Option<Payload>,
    ) -> Result<()> {
        self.knowledge
            .add_triple(subject, predicate, object, metadata)
            .await
    }

    pub async fn query(
        &self,
        subject: Option<&str>,
        predicate: Option<&str>,
        object: Option<&str>,
    ) -> Result<Vec<KnowledgeTriple>> {
        self.knowledge.query(subject, predicate, object).await
    }

    pub async fn related(&self, topic: &str) -> Result<Vec<KnowledgeTriple>> {
        self.knowledge.related(topic).await
    }
}

#[async_trait]
impl Agent for MemoryAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Memory
    }

    async fn receive_task(&self, task: Task) {
        self.events.record(task_received(&task));
    }

    async fn send_message(&self, message: &Message) {
        self.events.record(message_sent(message));
    }

    async fn status(&self) -> AgentStatus {
        let count = match self.knowledge.count().await {
            Ok(count) => Value::from(count),
            Err(e) => {
                tracing::warn!("Could not count knowledge items: {}", e);
                Value::Null
            }
        };
        AgentStatus::new(AgentRole::Memory).with("knowledge_count", count)
    }

    fn events(&self) -> Vec<AgentEvent> {
        self.events.events()
    }
}
