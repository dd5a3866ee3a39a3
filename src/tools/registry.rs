use crate::types::{AppError, Payload, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Handles one kind of executor action, selected by the action's `type` key.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    fn action_type(&self) -> &str;
    fn description(&self) -> &str;
    async fn execute(&self, action: &Payload) -> Result<String>;
}

pub struct ActionRegistry {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Create a new registry with the built-in handlers (notify)
    pub fn with_default_handlers() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(crate::tools::notify::NotifyHandler));
        registry
    }

    pub fn register(&mut self, handler: Arc<dyn ActionHandler>) {
        self.handlers
            .insert(handler.action_type().to_string(), handler);
    }

    pub async fn execute(&self, action_type: &str, action: &Payload) -> Result<String> {
        if let Some(handler) = self.handlers.get(action_type) {
            handler.execute(action).await
        } else {
            Err(AppError::NotFound(format!(
                "No handler for action type: {}",
                action_type
            )))
        }
    }

    /// Registered action types, sorted
    pub fn action_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.handlers.keys().cloned().collect();
        types.sort();
        types
    }

    /// `(type, description)` for every handler, sorted by type.
    pub fn describe(&self) -> Vec<(String, String)> {
        let mut described: Vec<(String, String)> = self
            .handlers
            .values()
            .map(|h| (h.action_type().to_string(), h.description().to_string()))
            .collect();
        described.sort();
        described
    }

    pub fn has_handler(&self, action_type: &str) -> bool {
        self.handlers.contains_key(action_type)
    }
}
