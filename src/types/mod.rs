use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// String-keyed mapping of dynamically typed values carried by tasks,
/// messages and knowledge records.
pub type Payload = serde_json::Map<String, Value>;

// ============= Agent Types =============

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Planner,
    Researcher,
    Memory,
    Critic,
    Executor,
}

impl AgentRole {
    /// Every role, in pipeline order.
    pub const ALL: [AgentRole; 5] = [
        AgentRole::Planner,
        AgentRole::Researcher,
        AgentRole::Memory,
        AgentRole::Critic,
        AgentRole::Executor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Planner => "planner",
            AgentRole::Researcher => "researcher",
            AgentRole::Memory => "memory",
            AgentRole::Critic => "critic",
            AgentRole::Executor => "executor",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "planner" => Ok(AgentRole::Planner),
            "researcher" => Ok(AgentRole::Researcher),
            "memory" => Ok(AgentRole::Memory),
            "critic" => Ok(AgentRole::Critic),
            "executor" => Ok(AgentRole::Executor),
            other => Err(AppError::InvalidInput(format!("Unknown agent role: {}", other))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Active,
    Completed,
    Failed,
}

/// A unit of work owned by a single agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub description: String,
    pub role: AgentRole,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub context: Payload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl Task {
    pub fn new(id: impl Into<String>, description: impl Into<String>, role: AgentRole) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            role,
            status: TaskStatus::Pending,
            context: Payload::new(),
            result: None,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_context(mut self, context: Payload) -> Self {
        self.context = context;
        self
    }
}

/// Inter-agent message. Transient: the bus turns it into a [`Task`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub sender: AgentRole,
    pub recipient: AgentRole,
    pub content: String,
    #[serde(default)]
    pub payload: Payload,
}

impl Message {
    pub fn new(sender: AgentRole, recipient: AgentRole, content: impl Into<String>) -> Self {
        Self {
            sender,
            recipient,
            content: content.into(),
            payload: Payload::new(),
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }
}

// ============= Knowledge Types =============

/// Content plus its embedding, as held by the knowledge store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeItem {
    pub id: String,
    pub content: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: Payload,
}

/// Append-only subject/predicate/object fact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeTriple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    #[serde(default)]
    pub metadata: Payload,
}

impl KnowledgeTriple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            metadata: Payload::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Payload) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Exact-match filter over triples. `None` fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripleFilter {
    pub subject: Option<String>,
    pub predicate: Option<String>,
    pub object: Option<String>,
}

impl TripleFilter {
    pub fn matches(&self, triple: &KnowledgeTriple) -> bool {
        self.subject.as_ref().map_or(true, |s| *s == triple.subject)
            && self.predicate.as_ref().map_or(true, |p| *p == triple.predicate)
            && self.object.as_ref().map_or(true, |o| *o == triple.object)
    }
}

// ============= Research Types =============

/// Normalized hit from any search provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SearchResult {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub snippet: String,
}

// ============= Event Types =============

/// One record in an agent's or the bus's event log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentEvent {
    pub event: String,
    #[serde(flatten)]
    pub fields: Payload,
    pub at: DateTime<Utc>,
}

impl AgentEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            fields: Payload::new(),
            at: Utc::now(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
