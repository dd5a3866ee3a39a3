//! TOML-based configuration for research-agent
//!
//! Everything is read from `research-agent.toml`. Every section and key is
//! optional; a missing file yields the built-in defaults, which reproduce the
//! demo workflow. API keys never live in the file: each section names the
//! environment variable that holds its key (`api_key_env`), and `.env` is
//! loaded by the binary before the config is read.

use crate::db::StoreProvider;
use crate::llm::{LLMClient, Provider};
use crate::memory::FallbackPolicy;
use crate::rag::{EmbeddingProvider, OpenAIEmbeddings, DEFAULT_DIMENSIONS};
use crate::research::{LocalNotesSearch, OpenAlexSearch, SearchProvider, DEFAULT_OPENALEX_URL};
use crate::types::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "research-agent.toml";

/// Root configuration structure loaded from research-agent.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default = "default_store")]
    pub store: StoreProvider,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub workflow: WorkflowConfig,
}

fn default_store() -> StoreProvider {
    StoreProvider::Sqlite {
        path: "data/knowledge.db".to_string(),
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            store: default_store(),
            embedding: EmbeddingConfig::default(),
            search: SearchConfig::default(),
            llm: LlmConfig::default(),
            workflow: WorkflowConfig::default(),
        }
    }
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// When set, each agent's events are also appended to `<dir>/<role>.jsonl`
    #[serde(default)]
    pub events_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            events_dir: None,
        }
    }
}

// ============= Embedding Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_openai_base")]
    pub api_base: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Fixed dimensionality of every stored vector
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    #[serde(default)]
    pub fallback: FallbackPolicy,

    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_dimensions() -> usize {
    DEFAULT_DIMENSIONS
}

fn default_embedding_timeout() -> u64 {
    30
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: default_api_key_env(),
            api_base: default_openai_base(),
            model: default_embedding_model(),
            dimensions: default_dimensions(),
            fallback: FallbackPolicy::default(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

// ============= Search Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebSearchBackend {
    #[default]
    OpenAlex,
    /// No web provider; the researcher answers with stub results
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    #[serde(default)]
    pub provider: WebSearchBackend,

    #[serde(default = "default_openalex_url")]
    pub openalex_url: String,

    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,

    /// Directory of Markdown/text notes for local search
    #[serde(default)]
    pub notes_dir: Option<String>,

    /// JSON file holding the `watch` topics
    #[serde(default = "default_watchlist_path")]
    pub watchlist_path: String,
}

fn default_watchlist_path() -> String {
    "data/watchlist.json".to_string()
}

fn default_openalex_url() -> String {
    DEFAULT_OPENALEX_URL.to_string()
}

fn default_search_timeout() -> u64 {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: WebSearchBackend::default(),
            openalex_url: default_openalex_url(),
            timeout_secs: default_search_timeout(),
            notes_dir: None,
            watchlist_path: default_watchlist_path(),
        }
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    /// Critic reflection uses the model only when enabled
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_openai_base")]
    pub api_base: String,

    #[serde(default = "default_chat_model")]
    pub model: String,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key_env: default_api_key_env(),
            api_base: default_openai_base(),
            model: default_chat_model(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

// ============= Workflow Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowConfig {
    #[serde(default = "default_goal_id")]
    pub goal_id: String,

    #[serde(default = "default_goal")]
    pub goal: String,

    #[serde(default = "default_research_id")]
    pub research_id: String,

    #[serde(default = "default_research_task")]
    pub research_task: String,

    /// Query sent to the web search provider
    #[serde(default = "default_query")]
    pub query: String,

    #[serde(default = "default_search_top_k")]
    pub top_k: usize,

    /// Topic stored as digest metadata and used for the recall self-check
    #[serde(default = "default_topic")]
    pub topic: String,

    #[serde(default = "default_recall_top_k")]
    pub recall_top_k: i64,
}

fn default_goal_id() -> String {
    "goal_1".to_string()
}

fn default_goal() -> String {
    "Summarize top 5 AI papers and store in memory.".to_string()
}

fn default_research_id() -> String {
    "research_1".to_string()
}

fn default_research_task() -> String {
    "Find top 5 AI papers.".to_string()
}

fn default_query() -> String {
    "top AI papers".to_string()
}

fn default_search_top_k() -> usize {
    5
}

fn default_topic() -> String {
    "AI papers".to_string()
}

fn default_recall_top_k() -> i64 {
    1
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            goal_id: default_goal_id(),
            goal: default_goal(),
            research_id: default_research_id(),
            research_task: default_research_task(),
            query: default_query(),
            top_k: default_search_top_k(),
            topic: default_topic(),
            recall_top_k: default_recall_top_k(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Where [`AgentConfig::load_with_origin`] found its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),
    /// The file was absent and built-in defaults apply.
    Defaults { missing: PathBuf },
}

impl ConfigOrigin {
    /// Log the origin; call after the tracing subscriber is installed.
    pub fn log(&self) {
        match self {
            ConfigOrigin::File(path) => info!(path = %path.display(), "Loaded configuration"),
            ConfigOrigin::Defaults { missing } => {
                info!(path = %missing.display(), "No configuration file, using defaults")
            }
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Configuration(e.to_string())
    }
}

impl AgentConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load `path` if it exists, otherwise use the defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_with_origin(path).map(|(config, _)| config)
    }

    /// Like [`AgentConfig::load_or_default`], also reporting where the
    /// configuration came from. Loading logs nothing, so callers can report
    /// the origin once their subscriber is installed.
    pub fn load_with_origin<P: AsRef<Path>>(path: P) -> Result<(Self, ConfigOrigin), ConfigError> {
        match Self::load(&path) {
            Ok(config) => Ok((config, ConfigOrigin::File(path.as_ref().to_path_buf()))),
            Err(ConfigError::FileNotFound(missing)) => {
                Ok((Self::default(), ConfigOrigin::Defaults { missing }))
            }
            Err(e) => Err(e),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AgentConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.embedding.dimensions == 0 {
            return Err(ConfigError::ValidationError(
                "embedding.dimensions must be greater than zero".to_string(),
            ));
        }
        if let StoreProvider::Sqlite { path } = &self.store {
            if path.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "store.path must not be empty".to_string(),
                ));
            }
        }
        if self.workflow.query.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "workflow.query must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok().filter(|v| !v.trim().is_empty())
    }

    /// Embedding provider, or `None` when disabled or its API key is unset
    pub fn embedding_provider(&self) -> crate::types::Result<Option<Arc<dyn EmbeddingProvider>>> {
        let cfg = &self.embedding;
        if !cfg.enabled {
            return Ok(None);
        }
        let Some(api_key) = self.resolve_env(&cfg.api_key_env) else {
            warn!(
                env = %cfg.api_key_env,
                "Embedding API key not set; knowledge items will get placeholder embeddings"
            );
            return Ok(None);
        };

        let provider = OpenAIEmbeddings::new(
            api_key,
            cfg.api_base.clone(),
            cfg.model.clone(),
            Duration::from_secs(cfg.timeout_secs),
        )?;
        Ok(Some(Arc::new(provider)))
    }

    /// Web search provider, or `None` when disabled
    pub fn web_search_provider(&self) -> crate::types::Result<Option<Arc<dyn SearchProvider>>> {
        match self.search.provider {
            WebSearchBackend::None => Ok(None),
            WebSearchBackend::OpenAlex => {
                let provider = OpenAlexSearch::new(
                    self.search.openalex_url.clone(),
                    Duration::from_secs(self.search.timeout_secs),
                )?;
                Ok(Some(Arc::new(provider)))
            }
        }
    }

    /// Local notes provider when `search.notes_dir` is set
    pub fn notes_search_provider(&self) -> Option<Arc<dyn SearchProvider>> {
        self.search
            .notes_dir
            .as_ref()
            .map(|dir| Arc::new(LocalNotesSearch::new(dir)) as Arc<dyn SearchProvider>)
    }

    /// Chat client for critic reflection, or `None` when disabled or unkeyed
    pub fn llm_client(&self) -> crate::types::Result<Option<Arc<dyn LLMClient>>> {
        let cfg = &self.llm;
        if !cfg.enabled {
            return Ok(None);
        }
        let Some(api_key) = self.resolve_env(&cfg.api_key_env) else {
            warn!(env = %cfg.api_key_env, "LLM API key not set; critic will use stub reflections");
            return Ok(None);
        };

        let provider = Provider::OpenAI {
            api_key,
            api_base: cfg.api_base.clone(),
            model: cfg.model.clone(),
        };
        let client = provider.create_client(Duration::from_secs(cfg.timeout_secs))?;
        Ok(Some(Arc::from(client)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = AgentConfig::from_toml_str("").unwrap();
        assert_eq!(config, AgentConfig::default());
        assert_eq!(config.workflow.goal, "Summarize top 5 AI papers and store in memory.");
        assert_eq!(config.workflow.recall_top_k, 1);
        assert_eq!(config.embedding.dimensions, 1536);
        assert_eq!(config.embedding.fallback, FallbackPolicy::Placeholder);
        assert!(!config.llm.enabled);
    }

    #[test]
    fn test_parse_config() {
        let config = AgentConfig::from_toml_str(
            r#"
[logging]
level = "debug"
format = "json"

[store]
backend = "memory"

[embedding]
dimensions = 8
fallback = "abort"

[search]
provider = "none"
notes_dir = "notes"

[workflow]
query = "graph neural networks"
top_k = 3
"#,
        )
        .unwrap();

        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.store, StoreProvider::Memory);
        assert_eq!(config.embedding.fallback, FallbackPolicy::Abort);
        assert_eq!(config.search.provider, WebSearchBackend::None);
        assert_eq!(config.workflow.query, "graph neural networks");
        assert_eq!(config.workflow.topic, "AI papers");
        assert!(config.web_search_provider().unwrap().is_none());
        assert!(config.notes_search_provider().is_some());
    }

    #[test]
    fn test_validation_rejects_zero_dimensions() {
        let err = AgentConfig::from_toml_str("[embedding]\ndimensions = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(AgentConfig::load(&path), Err(ConfigError::FileNotFound(_))));
        assert_eq!(
            AgentConfig::load_or_default(&path).unwrap(),
            AgentConfig::default()
        );
    }

    #[test]
    fn test_origin_reports_file_or_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent.toml");
        let (config, origin) = AgentConfig::load_with_origin(&absent).unwrap();
        assert_eq!(config, AgentConfig::default());
        assert_eq!(origin, ConfigOrigin::Defaults { missing: absent });

        let present = dir.path().join("research-agent.toml");
        fs::write(&present, "[workflow]\ntopic = \"graphs\"\n").unwrap();
        let (config, origin) = AgentConfig::load_with_origin(&present).unwrap();
        assert_eq!(config.workflow.topic, "graphs");
        assert_eq!(origin, ConfigOrigin::File(present));
    }

    #[test]
    fn test_written_defaults_parse_back() {
        let text = AgentConfig::default().to_toml_string().unwrap();
        assert_eq!(
            AgentConfig::from_toml_str(&text).unwrap(),
            AgentConfig::default()
        );
    }

    #[test]
    fn test_unkeyed_providers_are_absent() {
        let mut config = AgentConfig::default();
        config.embedding.api_key_env = "RESEARCH_AGENT_TEST_UNSET_KEY".to_string();
        config.llm.enabled = true;
        config.llm.api_key_env = "RESEARCH_AGENT_TEST_UNSET_KEY".to_string();

        assert!(config.embedding_provider().unwrap().is_none());
        assert!(config.llm_client().unwrap().is_none());
    }
}
