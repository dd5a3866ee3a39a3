use crate::tools::registry::ActionHandler;
use crate::types::{AppError, Payload, Result};
use async_trait::async_trait;

/// Emits the action's `message` as an info-level log line.
pub struct NotifyHandler;

#[async_trait]
impl ActionHandler for NotifyHandler {
    fn action_type(&self) -> &str {
        "notify"
    }

    fn description(&self) -> &str {
        "Send a notification message"
    }

    async fn execute(&self, action: &Payload) -> Result<String> {
        let message = action
            .get("message")
            .and_then(|m| m.as_str())
            .ok_or_else(|| AppError::InvalidInput("notify action requires a 'message' string".into()))?;

        tracing::info!(target: "research_agent::notify", "{}", message);
        Ok(format!("Notification sent: {}", message))
    }
}
