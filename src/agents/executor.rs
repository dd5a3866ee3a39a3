//! Executor agent: dispatches action requests to registered handlers.

use super::event_log::{EventLog, MemoryEventLog};
use super::{message_sent, task_received, Agent, AgentStatus};
use crate::tools::ActionRegistry;
use crate::types::{AgentEvent, AgentRole, Message, Payload, Task};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Returned for actions whose `type` has no registered handler.
pub const STUB_EXECUTION: &str = "Stub execution: action dispatched.";

pub struct ExecutorAgent {
    actions: ActionRegistry,
    events: Arc<dyn EventLog>,
}

impl Default for ExecutorAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutorAgent {
    /// Executor with the built-in handlers.
    pub fn new() -> Self {
        Self::with_actions(ActionRegistry::with_default_handlers())
    }

    pub fn with_actions(actions: ActionRegistry) -> Self {
        Self {
            actions,
            events: MemoryEventLog::shared(AgentRole::Executor.as_str()),
        }
    }

    pub fn with_event_log(mut self, events: Arc<dyn EventLog>) -> Self {
        self.events = events;
        self
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// Run `action` through the handler named by its `type` key.
    pub async fn execute_action(&self, action: Payload) -> String {
        self.events.record(
            AgentEvent::new("execute_action").with("action", Value::Object(action.clone())),
        );

        let action_type = action
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if !self.actions.has_handler(&action_type) {
            return STUB_EXECUTION.to_string();
        }

        match self.actions.execute(&action_type, &action).await {
            Ok(result) => {
                self.events.record(
                    AgentEvent::new("action_result")
                        .with("type", action_type)
                        .with("result", result.clone()),
                );
                result
            }
            Err(e) => {
                tracing::warn!(action_type = %action_type, "Action failed: {}", e);
                self.events.record(
                    AgentEvent::new("action_error")
                        .with("type", action_type.clone())
                        .with("error", e.to_string()),
                );
                format!("Action '{}' failed: {}", action_type, e)
            }
        }
    }
}

#[async_trait]
impl Agent for ExecutorAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Executor
    }

    async fn receive_task(&self, task: Task) {
        self.events.record(task_received(&task));
    }

    async fn send_message(&self, message: &Message) {
        self.events.record(message_sent(message));
    }

    async fn status(&self) -> AgentStatus {
        let actions: serde_json::Map<String, Value> = self
            .actions
            .describe()
            .into_iter()
            .map(|(action_type, description)| (action_type, Value::String(description)))
            .collect();
        AgentStatus::new(AgentRole::Executor)
            .with("log_length", self.events.len())
            .with("actions", Value::Object(actions))
    }

    fn events(&self) -> Vec<AgentEvent> {
        self.events.events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn action(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => panic!("action must be an object"),
        }
    }

    #[tokio::test]
    async fn test_notify_is_dispatched() {
        let executor = ExecutorAgent::new();
        let result = executor
            .execute_action(action(json!({"type": "notify", "message": "Digest stored in memory as item_1"})))
            .await;
        assert_eq!(result, "Notification sent: Digest stored in memory as item_1");
    }

    #[tokio::test]
    async fn test_unknown_type_returns_stub() {
        let executor = ExecutorAgent::new();
        assert_eq!(
            executor.execute_action(action(json!({"type": "slack"}))).await,
            STUB_EXECUTION
        );
        assert_eq!(executor.execute_action(Payload::new()).await, STUB_EXECUTION);
        let status = executor.status().await;
        assert_eq!(status.get("log_length"), Some(&json!(2)));
        assert_eq!(
            status.get("actions"),
            Some(&json!({"notify": "Send a notification message"}))
        );
    }

    #[tokio::test]
    async fn test_handler_error_is_reported() {
        let executor = ExecutorAgent::new();
        let result = executor.execute_action(action(json!({"type": "notify"}))).await;
        assert!(result.starts_with("Action 'notify' failed"));
        assert_eq!(executor.events().last().unwrap().event, "action_error");
    }
}
