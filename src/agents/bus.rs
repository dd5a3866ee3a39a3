//! In-process message bus.
//!
//! The bus keys agents by role. Sending a message logs it, then delivers it
//! to the recipient as a pending [`Task`]. Messages for unregistered roles
//! are dropped after logging.

use super::event_log::{EventLog, MemoryEventLog};
use super::Agent;
use crate::types::{AgentEvent, AgentRole, Message, Task, TaskStatus};
use std::collections::HashMap;
use std::sync::Arc;

/// Number of content characters used in a message task id.
const TASK_ID_CHARS: usize = 8;

pub struct MessageBus {
    agents: HashMap<AgentRole, Arc<dyn Agent>>,
    events: Arc<dyn EventLog>,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

/// `"msg_"` followed by the first eight characters of `content`.
pub fn message_task_id(content: &str) -> String {
    let prefix: String = content.chars().take(TASK_ID_CHARS).collect();
    format!("msg_{}", prefix)
}

impl MessageBus {
    pub fn new() -> Self {
        Self::with_event_log(MemoryEventLog::shared("message_bus"))
    }

    pub fn with_event_log(events: Arc<dyn EventLog>) -> Self {
        Self {
            agents: HashMap::new(),
            events,
        }
    }

    /// Register `agent` under its role, replacing any previous agent for it.
    pub fn register(&mut self, agent: Arc<dyn Agent>) {
        self.agents.insert(agent.role(), agent);
    }

    pub fn has_agent(&self, role: AgentRole) -> bool {
        self.agents.contains_key(&role)
    }

    pub async fn send(&self, message: &Message) {
        self.events.record(
            AgentEvent::new("send")
                .with("from", message.sender.as_str())
                .with("to", message.recipient.as_str())
                .with("content", message.content.clone()),
        );

        let Some(agent) = self.agents.get(&message.recipient) else {
            tracing::warn!(
                from = %message.sender,
                to = %message.recipient,
                "No agent registered for recipient, message dropped"
            );
            return;
        };

        let task = Task::new(
            message_task_id(&message.content),
            message.content.clone(),
            message.recipient,
        )
        .with_status(TaskStatus::Pending)
        .with_context(message.payload.clone());
        agent.receive_task(task).await;
    }

    pub fn events(&self) -> Vec<AgentEvent> {
        self.events.events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{CriticAgent, PlannerAgent};
    use serde_json::json;

    #[test]
    fn test_task_id_uses_first_eight_chars() {
        assert_eq!(message_task_id("Review research_1"), "msg_Review r");
        assert_eq!(message_task_id("hi"), "msg_hi");
        assert_eq!(message_task_id("ünïcödé-text"), "msg_ünïcödé-");
    }

    #[tokio::test]
    async fn test_delivers_to_registered_role() {
        let critic = Arc::new(CriticAgent::new());
        let mut bus = MessageBus::new();
        bus.register(critic.clone());

        bus.send(&Message::new(AgentRole::Planner, AgentRole::Critic, "Review research_1"))
            .await;

        let events = critic.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "receive_task");
        assert_eq!(events[0].field("description"), Some(&json!("Review research_1")));
        assert_eq!(events[0].field("task_id"), Some(&json!("msg_Review r")));

        let bus_events = bus.events();
        assert_eq!(bus_events[0].field("from"), Some(&json!("planner")));
        assert_eq!(bus_events[0].field("to"), Some(&json!("critic")));
    }

    #[tokio::test]
    async fn test_payload_becomes_task_context() {
        let planner = Arc::new(PlannerAgent::new());
        let mut bus = MessageBus::new();
        bus.register(planner.clone());

        let mut payload = crate::types::Payload::new();
        payload.insert("item_id".into(), json!("item_1"));
        bus.send(
            &Message::new(AgentRole::Memory, AgentRole::Planner, "stored").with_payload(payload),
        )
        .await;

        let task = planner.start_next().unwrap();
        assert_eq!(task.id, "msg_stored");
        assert_eq!(task.role, AgentRole::Planner);
        assert_eq!(task.context["item_id"], "item_1");
    }

    #[tokio::test]
    async fn test_unknown_recipient_is_dropped() {
        let critic = Arc::new(CriticAgent::new());
        let mut bus = MessageBus::new();
        bus.register(critic.clone());

        bus.send(&Message::new(AgentRole::Planner, AgentRole::Executor, "run it"))
            .await;

        assert!(critic.events().is_empty());
        assert_eq!(bus.events().len(), 1);
        assert!(!bus.has_agent(AgentRole::Executor));
    }
}
