//! The scripted research workflow as an ordered list of named stages.
//!
//! Each stage reads and writes a shared [`WorkflowRun`]. Stages run one at a
//! time; a stage error stops the pipeline.

use super::engine::Orchestrator;
use crate::agents::Agent;
use crate::types::{AgentRole, AppError, Message, Payload, Result, SearchResult, Task};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;

/// Predicate linking a stored digest to its topic in the triple log.
pub const DIGEST_PREDICATE: &str = "about";

/// Timing record for one executed stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepRecord {
    /// Stage name
    pub step: String,
    /// Agent doing most of the stage's work
    pub agent: AgentRole,
    /// Unix timestamp when the stage started
    pub timestamp: i64,
    /// Duration of the stage in milliseconds
    pub duration_ms: u64,
}

/// State threaded through the stages of one workflow run.
#[derive(Debug, Clone, Default)]
pub struct WorkflowRun {
    pub sources: Vec<SearchResult>,
    pub digest: Option<String>,
    pub memory_item_id: Option<String>,
    pub recall: Option<String>,
    pub recommendation: Option<String>,
    pub execution_result: Option<String>,
    pub steps: Vec<StepRecord>,
}

impl WorkflowRun {
    fn digest(&self) -> Result<&str> {
        self.digest
            .as_deref()
            .ok_or_else(|| AppError::Internal("No digest yet: run gather_research first".into()))
    }

    fn memory_item_id(&self) -> Result<&str> {
        self.memory_item_id
            .as_deref()
            .ok_or_else(|| AppError::Internal("No stored digest yet: run store_digest first".into()))
    }
}

#[async_trait]
pub trait WorkflowStage: Send + Sync {
    fn name(&self) -> &'static str;

    /// Agent doing most of the stage's work
    fn agent(&self) -> AgentRole;

    async fn run(&self, orchestrator: &Orchestrator, run: &mut WorkflowRun) -> Result<()>;
}

pub struct Pipeline {
    stages: Vec<Box<dyn WorkflowStage>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn WorkflowStage>>) -> Self {
        Self { stages }
    }

    /// The research workflow: goal, research, store, recall, reflect, notify.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(SubmitGoal),
            Box::new(AssignResearch),
            Box::new(GatherResearch),
            Box::new(StoreDigest),
            Box::new(QuickRecall),
            Box::new(Reflect),
            Box::new(NotifyExecutor),
        ])
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub async fn run(&self, orchestrator: &Orchestrator) -> Result<WorkflowRun> {
        let mut run = WorkflowRun::default();

        for stage in &self.stages {
            let started = Instant::now();
            let timestamp = Utc::now().timestamp();
            tracing::info!(step = stage.name(), agent = %stage.agent(), "Running workflow step");

            stage.run(orchestrator, &mut run).await.map_err(|e| {
                tracing::error!(step = stage.name(), "Workflow step failed: {}", e);
                e
            })?;

            let duration_ms = started.elapsed().as_millis() as u64;
            tracing::debug!(step = stage.name(), duration_ms, "Workflow step finished");
            run.steps.push(StepRecord {
                step: stage.name().to_string(),
                agent: stage.agent(),
                timestamp,
                duration_ms,
            });
        }

        Ok(run)
    }
}

fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        _ => Payload::new(),
    }
}

/// Planner receives the goal and starts working on it.
pub struct SubmitGoal;

#[async_trait]
impl WorkflowStage for SubmitGoal {
    fn name(&self) -> &'static str {
        "submit_goal"
    }

    fn agent(&self) -> AgentRole {
        AgentRole::Planner
    }

    async fn run(&self, orchestrator: &Orchestrator, _run: &mut WorkflowRun) -> Result<()> {
        let workflow = orchestrator.workflow();
        let planner = orchestrator.planner();
        planner
            .receive_task(Task::new(&workflow.goal_id, &workflow.goal, AgentRole::Planner))
            .await;
        planner.start_task(&workflow.goal_id)?;
        Ok(())
    }
}

/// Planner hands the research subtask to the researcher.
pub struct AssignResearch;

#[async_trait]
impl WorkflowStage for AssignResearch {
    fn name(&self) -> &'static str {
        "assign_research"
    }

    fn agent(&self) -> AgentRole {
        AgentRole::Planner
    }

    async fn run(&self, orchestrator: &Orchestrator, _run: &mut WorkflowRun) -> Result<()> {
        let workflow = orchestrator.workflow();
        let research = Task::new(
            &workflow.research_id,
            &workflow.research_task,
            AgentRole::Researcher,
        );
        orchestrator
            .planner()
            .assign_task(&research, AgentRole::Researcher);
        orchestrator.researcher().receive_task(research).await;
        Ok(())
    }
}

/// Researcher searches and condenses the hits into a digest.
pub struct GatherResearch;

#[async_trait]
impl WorkflowStage for GatherResearch {
    fn name(&self) -> &'static str {
        "gather_research"
    }

    fn agent(&self) -> AgentRole {
        AgentRole::Researcher
    }

    async fn run(&self, orchestrator: &Orchestrator, run: &mut WorkflowRun) -> Result<()> {
        let workflow = orchestrator.workflow();
        let researcher = orchestrator.researcher();

        let mut sources = researcher.web_search(&workflow.query, workflow.top_k).await;
        if researcher.has_local_search() {
            sources.extend(researcher.local_search(&workflow.query, workflow.top_k).await);
        }

        run.digest = Some(researcher.synthesize_digest(&sources));
        run.sources = sources;
        Ok(())
    }
}

/// Memory embeds and stores the digest, and links it to the topic.
pub struct StoreDigest;

#[async_trait]
impl WorkflowStage for StoreDigest {
    fn name(&self) -> &'static str {
        "store_digest"
    }

    fn agent(&self) -> AgentRole {
        AgentRole::Memory
    }

    async fn run(&self, orchestrator: &Orchestrator, run: &mut WorkflowRun) -> Result<()> {
        let workflow = orchestrator.workflow();
        let memory = orchestrator.memory();

        let metadata = payload(json!({
            "source": AgentRole::Researcher.as_str(),
            "topic": workflow.topic,
        }));
        let item_id = memory.embed_and_store(run.digest()?, Some(metadata)).await?;
        memory
            .add_triple(
                &item_id,
                DIGEST_PREDICATE,
                &workflow.topic,
                Some(payload(json!({ "task": workflow.research_id }))),
            )
            .await?;

        run.memory_item_id = Some(item_id);
        Ok(())
    }
}

/// Semantic search on the topic as a self-check that the digest is recallable.
pub struct QuickRecall;

#[async_trait]
impl WorkflowStage for QuickRecall {
    fn name(&self) -> &'static str {
        "quick_recall"
    }

    fn agent(&self) -> AgentRole {
        AgentRole::Memory
    }

    async fn run(&self, orchestrator: &Orchestrator, run: &mut WorkflowRun) -> Result<()> {
        let workflow = orchestrator.workflow();
        let recalled = orchestrator
            .memory()
            .semantic_search(&workflow.topic, workflow.recall_top_k)
            .await?;
        run.recall = recalled.into_iter().next().map(|item| item.content);
        Ok(())
    }
}

/// Critic is asked to review the research outcome and reflects on it.
pub struct Reflect;

#[async_trait]
impl WorkflowStage for Reflect {
    fn name(&self) -> &'static str {
        "reflect"
    }

    fn agent(&self) -> AgentRole {
        AgentRole::Critic
    }

    async fn run(&self, orchestrator: &Orchestrator, run: &mut WorkflowRun) -> Result<()> {
        let workflow = orchestrator.workflow();
        let outcome = payload(json!({
            "task": workflow.research_id,
            "result": run.digest()?,
        }));

        orchestrator
            .bus()
            .send(
                &Message::new(
                    AgentRole::Planner,
                    AgentRole::Critic,
                    format!("Review outcome of {}", workflow.research_id),
                )
                .with_payload(outcome.clone()),
            )
            .await;

        let critic = orchestrator.critic();
        critic.monitor_outcome(outcome.clone());
        run.recommendation = Some(critic.trigger_reflection(outcome).await);
        Ok(())
    }
}

/// Executor is told where the digest lives and runs the notify action.
pub struct NotifyExecutor;

#[async_trait]
impl WorkflowStage for NotifyExecutor {
    fn name(&self) -> &'static str {
        "notify_executor"
    }

    fn agent(&self) -> AgentRole {
        AgentRole::Executor
    }

    async fn run(&self, orchestrator: &Orchestrator, run: &mut WorkflowRun) -> Result<()> {
        let item_id = run.memory_item_id()?.to_string();
        let notice = format!("Digest stored in memory as {}", item_id);
        let action = payload(json!({ "type": "notify", "message": notice }));

        orchestrator
            .bus()
            .send(
                &Message::new(AgentRole::Planner, AgentRole::Executor, notice.clone())
                    .with_payload(action.clone()),
            )
            .await;

        run.execution_result = Some(orchestrator.executor().execute_action(action).await);

        orchestrator.planner().complete_task(
            &orchestrator.workflow().goal_id,
            json!({ "memory_item_id": item_id }),
        )?;
        Ok(())
    }
}
