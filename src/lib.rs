//! # research-agent
//!
//! A toy multi-agent research assistant. Role-specific agents (planner,
//! researcher, memory, critic, executor) cooperate through an in-process
//! message bus to take a goal, fetch information, store it as embeddings in a
//! knowledge store, and reflect on the outcome.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use research_agent::{AgentConfig, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AgentConfig::load_or_default("research-agent.toml")?;
//!     let orchestrator = Orchestrator::from_config(&config).await?;
//!
//!     let summary = orchestrator.run_workflow().await?;
//!     println!("{}", summary.final_digest);
//!     Ok(())
//! }
//! ```
//!
//! ### Semantic Memory
//!
//! ```rust,ignore
//! use research_agent::db::StoreProvider;
//! use research_agent::memory::KnowledgeBase;
//!
//! let store = StoreProvider::Memory.create_store().await?;
//! let knowledge = KnowledgeBase::new(store, 1536).with_embedder(embedder);
//!
//! let id = knowledge.embed_and_store("Attention is all you need.", None).await?;
//! let hits = knowledge.semantic_search("transformers", 3).await?;
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Task/message model and error handling
//! - [`db`] - Knowledge store backends (in-memory, libsql)
//! - [`memory`] - Knowledge base: embeddings, similarity search, triples
//! - [`rag`] - Embedding providers and cosine ranking
//! - [`research`] - Search providers (OpenAlex, local notes)
//! - [`llm`] - Chat completion client for critic reflection
//! - [`agents`] - Agent trait, role agents, message bus, event logs
//! - [`tools`] - Executor action handlers
//! - [`workflows`] - Orchestrator and the research pipeline
//! - [`utils`] - TOML configuration
//! - [`cli`] - Command-line interface

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Role agents, the message bus, and event logs.
pub mod agents;
/// Command-line parsing, handlers, and colored output.
pub mod cli;
/// Knowledge store backends.
pub mod db;
/// Chat completion clients.
pub mod llm;
/// Semantic memory over a knowledge store.
pub mod memory;
/// Embeddings and similarity ranking.
pub mod rag;
/// Web and local search providers.
pub mod research;
/// Executor action handlers.
pub mod tools;
/// Core types (tasks, messages, knowledge, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;
/// Research workflow orchestration.
pub mod workflows;

// Re-export commonly used types
pub use agents::{Agent, AgentStatus, MessageBus};
pub use db::{KnowledgeStore, StoreProvider};
pub use llm::{LLMClient, Provider};
pub use memory::{FallbackPolicy, KnowledgeBase};
pub use rag::EmbeddingProvider;
pub use research::SearchProvider;
pub use tools::registry::ActionRegistry;
pub use types::{AppError, Result};
pub use utils::toml_config::AgentConfig;
pub use workflows::{Orchestrator, WorkflowSummary};
