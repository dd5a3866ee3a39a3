//! Role-specific agents and the bus that routes messages between them.
//!
//! Every agent implements [`Agent`]. Work arrives either directly through
//! [`Agent::receive_task`] or as a [`Message`] routed by the [`MessageBus`],
//! which turns it into a [`Task`] for the addressed role.

pub mod bus;
pub mod critic;
pub mod event_log;
pub mod executor;
pub mod memory;
pub mod planner;
pub mod researcher;

use crate::types::{AgentEvent, AgentRole, Message, Task};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// Re-export commonly used types
pub use bus::MessageBus;
pub use critic::CriticAgent;
pub use event_log::{EventLog, JsonlEventLog, MemoryEventLog, NoopEventLog};
pub use executor::ExecutorAgent;
pub use memory::MemoryAgent;
pub use planner::{PlannerAgent, ProgressReport};
pub use researcher::ResearcherAgent;

/// Base trait for all agents
#[async_trait]
pub trait Agent: Send + Sync {
    /// The role this agent plays; the bus routes on it.
    fn role(&self) -> AgentRole;

    /// Accept a task. Fire-and-forget: the agent records it and returns.
    async fn receive_task(&self, task: Task);

    /// Record an outgoing message. Delivery is the bus's job.
    async fn send_message(&self, message: &Message);

    /// Snapshot of the agent's counters.
    async fn status(&self) -> AgentStatus;

    /// Events recorded so far, oldest first.
    fn events(&self) -> Vec<AgentEvent>;
}

/// Role plus role-specific counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentStatus {
    pub role: AgentRole,
    #[serde(flatten)]
    pub counters: BTreeMap<String, Value>,
}

impl AgentStatus {
    pub fn new(role: AgentRole) -> Self {
        Self {
            role,
            counters: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.counters.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.counters.get(key)
    }
}

/// `receive_task` event shared by every role.
pub(crate) fn task_received(task: &Task) -> AgentEvent {
    AgentEvent::new("receive_task")
        .with("task_id", task.id.clone())
        .with("description", task.description.clone())
}

/// `send_message` event shared by every role.
pub(crate) fn message_sent(message: &Message) -> AgentEvent {
    AgentEvent::new("send_message")
        .with("to", message.recipient.as_str())
        .with("content", message.content.clone())
}
