//! LLM provider clients.
//!
//! - [`LLMClient`] - The core trait that providers implement
//! - [`Provider`] - Runtime provider selection
//!
//! # Example
//!
//! ```ignore
//! use research_agent::llm::Provider;
//!
//! let client = Provider::OpenAI { api_key, api_base, model }.create_client(timeout)?;
//! let note = client.generate_with_system("You are a critic.", "Review: ...").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;
/// OpenAI-compatible chat completions client.
pub mod openai;

pub use client::{LLMClient, Provider};
pub use openai::OpenAIChatClient;
