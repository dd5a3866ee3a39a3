//! Planner agent: owns the task lifecycle.
//!
//! Incoming tasks are queued. [`PlannerAgent::start_next`] moves the oldest
//! queued task to the active set and [`PlannerAgent::start_task`] a specific
//! one; completing or failing it moves it to the finished set. Task decomposition is not implemented and yields nothing.

use super::event_log::{EventLog, MemoryEventLog};
use super::{message_sent, task_received, Agent, AgentStatus};
use crate::types::{
    AgentEvent, AgentRole, AppError, Message, Result, Task, TaskStatus,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Default)]
struct TaskBook {
    queue: VecDeque<Task>,
    active: Vec<Task>,
    finished: Vec<Task>,
}

/// Result of [`PlannerAgent::monitor_progress`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressReport {
    pub queued: usize,
    pub active: Vec<String>,
    pub completed: Vec<String>,
    pub failed: Vec<String>,
}

pub struct PlannerAgent {
    tasks: Mutex<TaskBook>,
    events: Arc<dyn EventLog>,
}

impl Default for PlannerAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl PlannerAgent {
    pub fn new() -> Self {
        Self::with_event_log(MemoryEventLog::shared(AgentRole::Planner.as_str()))
    }

    pub fn with_event_log(events: Arc<dyn EventLog>) -> Self {
        Self {
            tasks: Mutex::new(TaskBook::default()),
            events,
        }
    }

    /// Break `task` into subtasks. No decomposition strategy exists yet, so
    /// this always returns an empty list.
    pub fn decompose_task(&self, task: &Task) -> Vec<Task> {
        self.events
            .record(AgentEvent::new("decompose_task").with("task_id", task.id.clone()));
        Vec::new()
    }

    /// Record that `subtask` is handed to `role`. Delivery is the caller's job.
    pub fn assign_task(&self, subtask: &Task, role: AgentRole) {
        self.events.record(
            AgentEvent::new("assign_task")
                .with("subtask_id", subtask.id.clone())
                .with("assigned_to", role.as_str()),
        );
    }

    pub fn monitor_progress(&self) -> ProgressReport {
        let report = {
            let book = self.tasks.lock();
            let (failed, completed): (Vec<&Task>, Vec<&Task>) = book
                .finished
                .iter()
                .partition(|t| t.status == TaskStatus::Failed);
            ProgressReport {
                queued: book.queue.len(),
                active: book.active.iter().map(|t| t.id.clone()).collect(),
                completed: completed.into_iter().map(|t| t.id.clone()).collect(),
                failed: failed.into_iter().map(|t| t.id.clone()).collect(),
            }
        };

        self.events.record(
            AgentEvent::new("monitor_progress")
                .with("queued", report.queued)
                .with("active", report.active.len())
                .with("completed", report.completed.len())
                .with("failed", report.failed.len()),
        );
        report
    }

    /// Move the oldest queued task to the active set.
    pub fn start_next(&self) -> Option<Task> {
        let started = {
            let mut book = self.tasks.lock();
            let mut task = book.queue.pop_front()?;
            task.status = TaskStatus::Active;
            book.active.push(task.clone());
            task
        };

        self.events
            .record(AgentEvent::new("start_task").with("task_id", started.id.clone()));
        Some(started)
    }

    /// Move the queued task `task_id` to the active set, leaving every other
    /// queued task in place.
    pub fn start_task(&self, task_id: &str) -> Result<Task> {
        let started = {
            let mut book = self.tasks.lock();
            let index = book
                .queue
                .iter()
                .position(|t| t.id == task_id)
                .ok_or_else(|| AppError::NotFound(format!("No queued task with id {}", task_id)))?;
            let mut task = book
                .queue
                .remove(index)
                .ok_or_else(|| AppError::Internal(format!("Queue index {} vanished", index)))?;
            task.status = TaskStatus::Active;
            book.active.push(task.clone());
            task
        };

        self.events
            .record(AgentEvent::new("start_task").with("task_id", started.id.clone()));
        Ok(started)
    }

    /// Mark an active task completed with `result`.
    pub fn complete_task(&self, task_id: &str, result: Value) -> Result<Task> {
        let task = self.finish(task_id, TaskStatus::Completed, result)?;
        self.events
            .record(AgentEvent::new("complete_task").with("task_id", task_id));
        Ok(task)
    }

    /// Mark a task failed, keeping `reason` as its result. Active tasks are
    /// looked up first, then queued ones, so work that never started can
    /// still be failed.
    pub fn fail_task(&self, task_id: &str, reason: &str) -> Result<Task> {
        let result = json!({ "error": reason });
        let task = match self.finish(task_id, TaskStatus::Failed, result.clone()) {
            Err(AppError::NotFound(_)) => self.finish_queued(task_id, result)?,
            other => other?,
        };
        tracing::warn!(task_id, reason, "Task failed");
        self.events.record(
            AgentEvent::new("fail_task")
                .with("task_id", task_id)
                .with("reason", reason),
        );
        Ok(task)
    }

    fn finish(&self, task_id: &str, status: TaskStatus, result: Value) -> Result<Task> {
        let mut book = self.tasks.lock();
        let index = book
            .active
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| AppError::NotFound(format!("No active task with id {}", task_id)))?;

        let mut task = book.active.remove(index);
        task.status = status;
        task.result = Some(result);
        book.finished.push(task.clone());
        Ok(task)
    }

    fn finish_queued(&self, task_id: &str, result: Value) -> Result<Task> {
        let mut book = self.tasks.lock();
        let index = book
            .queue
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| AppError::NotFound(format!("No open task with id {}", task_id)))?;

        let Some(mut task) = book.queue.remove(index) else {
            return Err(AppError::Internal(format!("Queue index {} vanished", index)));
        };
        task.status = TaskStatus::Failed;
        task.result = Some(result);
        book.finished.push(task.clone());
        Ok(task)
    }
}

#[async_trait]
impl Agent for PlannerAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Planner
    }

    async fn receive_task(&self, task: Task) {
        self.events.record(task_received(&task));
        self.tasks.lock().queue.push_back(task);
    }

    async fn send_message(&self, message: &Message) {
        self.events.record(message_sent(message));
    }

    async fn status(&self) -> AgentStatus {
        let book = self.tasks.lock();
        AgentStatus::new(AgentRole::Planner)
            .with("queue_length", book.queue.len())
            .with(
                "active_tasks",
                book.active.iter().map(|t| t.id.clone()).collect::<Vec<_>>(),
            )
            .with(
                "completed_tasks",
                book.finished.iter().map(|t| t.id.clone()).collect::<Vec<_>>(),
            )
    }

    fn events(&self) -> Vec<AgentEvent> {
        self.events.events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(id: &str) -> Task {
        Task::new(id, "Summarize papers", AgentRole::Planner)
    }

    #[tokio::test]
    async fn test_received_tasks_are_queued() {
        let planner = PlannerAgent::new();
        planner.receive_task(goal("goal_1")).await;

        let status = planner.status().await;
        assert_eq!(status.get("queue_length"), Some(&json!(1)));
        assert_eq!(status.get("active_tasks"), Some(&json!([])));
        assert_eq!(planner.events()[0].event, "receive_task");
    }

    #[tokio::test]
    async fn test_lifecycle_moves_tasks_between_collections() {
        let planner = PlannerAgent::new();
        planner.receive_task(goal("a")).await;
        planner.receive_task(goal("b")).await;

        let started = planner.start_next().unwrap();
        assert_eq!(started.id, "a");
        assert_eq!(started.status, TaskStatus::Active);

        let done = planner.complete_task("a", json!("ok")).unwrap();
        assert_eq!(done.status, TaskStatus::Completed);

        planner.start_next().unwrap();
        planner.fail_task("b", "search offline").unwrap();

        let report = planner.monitor_progress();
        assert_eq!(report.queued, 0);
        assert!(report.active.is_empty());
        assert_eq!(report.completed, vec!["a"]);
        assert_eq!(report.failed, vec!["b"]);

        let status = planner.status().await;
        assert_eq!(status.get("completed_tasks"), Some(&json!(["a", "b"])));
    }

    #[test]
    fn test_completing_unknown_task_is_not_found() {
        let planner = PlannerAgent::new();
        assert!(matches!(
            planner.complete_task("missing", Value::Null),
            Err(AppError::NotFound(_))
        ));
        assert!(planner.start_next().is_none());
    }

    #[tokio::test]
    async fn test_start_task_picks_by_id() {
        let planner = PlannerAgent::new();
        planner.receive_task(goal("msg_earlier")).await;
        planner.receive_task(goal("goal_1")).await;

        let started = planner.start_task("goal_1").unwrap();
        assert_eq!(started.status, TaskStatus::Active);

        let report = planner.monitor_progress();
        assert_eq!(report.queued, 1);
        assert_eq!(report.active, vec!["goal_1"]);
        assert!(matches!(planner.start_task("goal_1"), Err(AppError::NotFound(_))));
        assert_eq!(planner.start_next().unwrap().id, "msg_earlier");
    }

    #[tokio::test]
    async fn test_queued_task_can_be_failed() {
        let planner = PlannerAgent::new();
        planner.receive_task(goal("goal_1")).await;

        let failed = planner.fail_task("goal_1", "store offline").unwrap();
        assert_eq!(failed.status, TaskStatus::Failed);

        let report = planner.monitor_progress();
        assert_eq!(report.queued, 0);
        assert_eq!(report.failed, vec!["goal_1"]);
        assert!(matches!(planner.fail_task("goal_1", "again"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_decompose_is_empty_and_logged() {
        let planner = PlannerAgent::new();
        assert!(planner.decompose_task(&goal("g")).is_empty());

        planner.assign_task(
            &Task::new("research_1", "Find papers", AgentRole::Researcher),
            AgentRole::Researcher,
        );
        let events = planner.events();
        assert_eq!(events[0].event, "decompose_task");
        assert_eq!(events[1].field("assigned_to"), Some(&json!("researcher")));
    }
}
