//! Executor action handlers.
//!
//! An action is a [`Payload`](crate::types::Payload) whose `type` key names
//! the handler. The [`registry`](crate::tools::registry) maps types to
//! handlers:
//! ```ignore
//! let registry = ActionRegistry::with_default_handlers();
//! let mut action = Payload::new();
//! action.insert("type".into(), json!("notify"));
//! action.insert("message".into(), json!("Digest stored"));
//! let result = registry.execute("notify", &action).await?;
//! ```

/// Built-in `notify` action.
pub mod notify;
/// Action handler registration and dispatch.
pub mod registry;

pub use notify::NotifyHandler;
pub use registry::{ActionHandler, ActionRegistry};
