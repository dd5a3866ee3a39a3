//! Orchestrator
//!
//! Owns one agent per role plus the message bus, and drives the research
//! workflow through a [`Pipeline`].

use super::pipeline::{Pipeline, StepRecord};
use crate::agents::{
    Agent, CriticAgent, EventLog, ExecutorAgent, JsonlEventLog, MemoryAgent, MemoryEventLog,
    MessageBus, PlannerAgent, ResearcherAgent,
};
use crate::memory::KnowledgeBase;
use crate::types::{AgentEvent, AgentRole, Result};
use crate::utils::toml_config::{AgentConfig, WorkflowConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Output from a workflow execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub planner_log: Vec<AgentEvent>,
    pub researcher_log: Vec<AgentEvent>,
    pub memory_log: Vec<AgentEvent>,
    pub critic_log: Vec<AgentEvent>,
    pub executor_log: Vec<AgentEvent>,
    pub message_bus_log: Vec<AgentEvent>,
    /// Digest synthesized by the researcher
    pub final_digest: String,
    /// Id under which the digest was stored
    pub memory_item_id: String,
    pub critic_recommendation: String,
    /// Content of the best semantic match for the topic, if any
    pub quick_recall_result: Option<String>,
    /// What the executor reported for the notify action
    pub execution_result: String,
    /// Timing of each executed step, in order
    pub steps: Vec<StepRecord>,
}

pub struct Orchestrator {
    planner: Arc<PlannerAgent>,
    researcher: Arc<ResearcherAgent>,
    memory: Arc<MemoryAgent>,
    critic: Arc<CriticAgent>,
    executor: Arc<ExecutorAgent>,
    bus: MessageBus,
    workflow: WorkflowConfig,
    pipeline: Pipeline,
}

fn event_log(events_dir: Option<&str>, source: &str) -> Result<Arc<dyn EventLog>> {
    match events_dir {
        Some(dir) => {
            let log = JsonlEventLog::open(source, Path::new(dir).join(format!("{}.jsonl", source)))?;
            tracing::debug!(source, path = %log.path().display(), "Writing agent events");
            Ok(Arc::new(log))
        }
        None => Ok(MemoryEventLog::shared(source)),
    }
}

/// Open the configured store and wrap it in a knowledge base with the
/// configured embedder and fallback policy.
pub async fn open_knowledge_base(config: &AgentConfig) -> Result<KnowledgeBase> {
    let store = config.store.create_store().await?;
    tracing::info!(backend = store.backend_name(), "Opened knowledge store");

    let mut knowledge = KnowledgeBase::new(store, config.embedding.dimensions)
        .with_fallback(config.embedding.fallback);
    if let Some(embedder) = config.embedding_provider()? {
        knowledge = knowledge.with_embedder(embedder);
    }
    Ok(knowledge)
}

impl Orchestrator {
    /// Orchestrator over `memory` with provider-less agents and the default
    /// workflow.
    pub fn new(memory: MemoryAgent) -> Self {
        let mut orchestrator = Self {
            planner: Arc::new(PlannerAgent::new()),
            researcher: Arc::new(ResearcherAgent::new()),
            memory: Arc::new(memory),
            critic: Arc::new(CriticAgent::new()),
            executor: Arc::new(ExecutorAgent::new()),
            bus: MessageBus::new(),
            workflow: WorkflowConfig::default(),
            pipeline: Pipeline::standard(),
        };
        orchestrator.register_all();
        orchestrator
    }

    /// Wire every agent from configuration: store, embedder, search and chat
    /// providers, and event sinks.
    pub async fn from_config(config: &AgentConfig) -> Result<Self> {
        let events_dir = config.logging.events_dir.as_deref();

        let memory = MemoryAgent::with_event_log(
            open_knowledge_base(config).await?,
            event_log(events_dir, AgentRole::Memory.as_str())?,
        );

        let mut researcher = ResearcherAgent::new()
            .with_event_log(event_log(events_dir, AgentRole::Researcher.as_str())?);
        if let Some(web) = config.web_search_provider()? {
            researcher = researcher.with_web_search(web);
        }
        if let Some(notes) = config.notes_search_provider() {
            researcher = researcher.with_local_search(notes);
        }

        let mut critic =
            CriticAgent::new().with_event_log(event_log(events_dir, AgentRole::Critic.as_str())?);
        if let Some(llm) = config.llm_client()? {
            critic = critic.with_llm(llm);
        }

        let orchestrator = Self::new(memory)
            .with_planner(PlannerAgent::with_event_log(event_log(
                events_dir,
                AgentRole::Planner.as_str(),
            )?))
            .with_researcher(researcher)
            .with_critic(critic)
            .with_executor(
                ExecutorAgent::new()
                    .with_event_log(event_log(events_dir, AgentRole::Executor.as_str())?),
            )
            .with_bus(MessageBus::with_event_log(event_log(events_dir, "message_bus")?))
            .with_workflow(config.workflow.clone());
        Ok(orchestrator)
    }

    fn register_all(&mut self) {
        for agent in self.agents() {
            self.bus.register(agent);
        }
    }

    pub fn with_planner(mut self, planner: PlannerAgent) -> Self {
        self.planner = Arc::new(planner);
        self.bus.register(self.planner.clone());
        self
    }

    pub fn with_researcher(mut self, researcher: ResearcherAgent) -> Self {
        self.researcher = Arc::new(researcher);
        self.bus.register(self.researcher.clone());
        self
    }

    pub fn with_critic(mut self, critic: CriticAgent) -> Self {
        self.critic = Arc::new(critic);
        self.bus.register(self.critic.clone());
        self
    }

    pub fn with_executor(mut self, executor: ExecutorAgent) -> Self {
        self.executor = Arc::new(executor);
        self.bus.register(self.executor.clone());
        self
    }

    /// Replace the bus; every current agent is registered on it.
    pub fn with_bus(mut self, bus: MessageBus) -> Self {
        self.bus = bus;
        self.register_all();
        self
    }

    pub fn with_workflow(mut self, workflow: WorkflowConfig) -> Self {
        self.workflow = workflow;
        self
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn planner(&self) -> &PlannerAgent {
        &self.planner
    }

    pub fn researcher(&self) -> &ResearcherAgent {
        &self.researcher
    }

    pub fn memory(&self) -> &MemoryAgent {
        &self.memory
    }

    pub fn critic(&self) -> &CriticAgent {
        &self.critic
    }

    pub fn executor(&self) -> &ExecutorAgent {
        &self.executor
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    pub fn workflow(&self) -> &WorkflowConfig {
        &self.workflow
    }

    /// Every agent, in pipeline order.
    pub fn agents(&self) -> Vec<Arc<dyn Agent>> {
        vec![
            self.planner.clone() as Arc<dyn Agent>,
            self.researcher.clone() as Arc<dyn Agent>,
            self.memory.clone() as Arc<dyn Agent>,
            self.critic.clone() as Arc<dyn Agent>,
            self.executor.clone() as Arc<dyn Agent>,
        ]
    }

    /// Run the pipeline and collect every log into a summary.
    ///
    /// A failing step marks the goal task failed on the planner and returns
    /// the error.
    pub async fn run_workflow(&self) -> Result<WorkflowSummary> {
        tracing::info!(goal = %self.workflow.goal, "Starting research workflow");

        let run = match self.pipeline.run(self).await {
            Ok(run) => run,
            Err(e) => {
                if let Err(mark_err) = self.planner.fail_task(&self.workflow.goal_id, &e.to_string()) {
                    tracing::warn!(
                        goal_id = %self.workflow.goal_id,
                        error = %mark_err,
                        "Could not mark goal as failed"
                    );
                }
                return Err(e);
            }
        };

        let summary = WorkflowSummary {
            planner_log: self.planner.events(),
            researcher_log: self.researcher.events(),
            memory_log: self.memory.events(),
            critic_log: self.critic.events(),
            executor_log: self.executor.events(),
            message_bus_log: self.bus.events(),
            final_digest: run.digest.unwrap_or_default(),
            memory_item_id: run.memory_item_id.unwrap_or_default(),
            critic_recommendation: run.recommendation.unwrap_or_default(),
            quick_recall_result: run.recall,
            execution_result: run.execution_result.unwrap_or_default(),
            steps: run.steps,
        };

        tracing::info!(
            memory_item_id = %summary.memory_item_id,
            steps = summary.steps.len(),
            "Research workflow finished"
        );
        Ok(summary)
    }
}
