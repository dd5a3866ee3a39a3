//! Workflow Module
//!
//! The scripted research workflow, run as a pipeline of named steps over one
//! agent per role:
//!
//! 1. `submit_goal` - planner receives and starts the goal
//! 2. `assign_research` - planner hands the research task to the researcher
//! 3. `gather_research` - researcher searches and synthesizes a digest
//! 4. `store_digest` - memory embeds and stores the digest, records a triple
//! 5. `quick_recall` - semantic search on the topic as a self-check
//! 6. `reflect` - critic is messaged, observes the outcome and reflects
//! 7. `notify_executor` - executor is messaged and runs a notify action
//!
//! The orchestrator also exposes one-shot actions outside the pipeline
//! (`research_topic`, `recall`, `check_watchlist`, `suggest_topic`).
//!
//! Goal, query, topic and result counts come from the `[workflow]` section
//! of `research-agent.toml`:
//!
//! ```toml
//! [workflow]
//! goal = "Summarize top 5 AI papers and store in memory."
//! query = "top AI papers"
//! top_k = 5
//! topic = "AI papers"
//! recall_top_k = 1
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let orchestrator = Orchestrator::from_config(&config).await?;
//! let summary = orchestrator.run_workflow().await?;
//! println!("Stored digest as {}", summary.memory_item_id);
//! ```

pub mod actions;
pub mod engine;
pub mod pipeline;

pub use actions::{TopicResearch, WatchReport};
pub use engine::{open_knowledge_base, Orchestrator, WorkflowSummary};
pub use pipeline::{Pipeline, StepRecord, WorkflowRun, WorkflowStage};
