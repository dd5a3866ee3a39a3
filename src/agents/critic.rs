//! Critic agent: observes outcomes and produces reflection notes.

use super::event_log::{EventLog, MemoryEventLog};
use super::{message_sent, task_received, Agent, AgentStatus};
use crate::llm::LLMClient;
use crate::types::{AgentEvent, AgentRole, Message, Payload, Task};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Returned when no chat model is configured or the model call fails.
pub const STUB_RECOMMENDATION: &str = "Stub recommendation: Consider alternative strategies.";

const REFLECTION_SYSTEM_PROMPT: &str = "You are the critic in a research assistant team. \
Review the outcome you are given and reply with one short, concrete recommendation \
for improving the next attempt.";

pub struct CriticAgent {
    llm: Option<Arc<dyn LLMClient>>,
    events: Arc<dyn EventLog>,
}

impl Default for CriticAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl CriticAgent {
    pub fn new() -> Self {
        Self {
            llm: None,
            events: MemoryEventLog::shared(AgentRole::Critic.as_str()),
        }
    }

    pub fn with_llm(mut self, llm: Arc<dyn LLMClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_event_log(mut self, events: Arc<dyn EventLog>) -> Self {
        self.events = events;
        self
    }

    /// Record an observed outcome. Expected keys: `task`, `result`.
    pub fn monitor_outcome(&self, outcome: Payload) {
        self.events
            .record(AgentEvent::new("monitor_outcome").with("outcome", Value::Object(outcome)));
    }

    /// Reflect on `context` and return a recommendation.
    pub async fn trigger_reflection(&self, context: Payload) -> String {
        let context = Value::Object(context);
        self.events
            .record(AgentEvent::new("trigger_reflection").with("context", context.clone()));

        let Some(llm) = &self.llm else {
            return STUB_RECOMMENDATION.to_string();
        };

        let prompt = format!(
            "Outcome to review:\n{}",
            serde_json::to_string_pretty(&context).unwrap_or_else(|_| context.to_string())
        );
        match llm.generate_with_system(REFLECTION_SYSTEM_PROMPT, &prompt).await {
            Ok(note) if !note.trim().is_empty() => {
                self.events
                    .record(AgentEvent::new("reflection").with("model", llm.model_name()));
                note.trim().to_string()
            }
            Ok(_) => {
                tracing::warn!("Reflection model returned an empty note");
                self.events
                    .record(AgentEvent::new("reflection_error").with("error", "empty response"));
                STUB_RECOMMENDATION.to_string()
            }
            Err(e) => {
                tracing::warn!("Reflection failed, using stub recommendation: {}", e);
                self.events
                    .record(AgentEvent::new("reflection_error").with("error", e.to_string()));
                STUB_RECOMMENDATION.to_string()
            }
        }
    }
}

#[async_trait]
impl Agent for CriticAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Critic
    }

    async fn receive_task(&self, task: Task) {
        self.events.record(task_received(&task));
    }

    async fn send_message(&self, message: &Message) {
        self.events.record(message_sent(message));
    }

    async fn status(&self) -> AgentStatus {
        AgentStatus::new(AgentRole::Critic).with("log_length", self.events.len())
    }

    fn events(&self) -> Vec<AgentEvent> {
        self.events.events()
    }
}
