//! Mock providers for testing.
//!
//! Deterministic stand-ins for the chat, embedding and search capabilities
//! so tests never touch the network.

use async_trait::async_trait;
use research_agent::llm::LLMClient;
use research_agent::rag::EmbeddingProvider;
use research_agent::research::SearchProvider;
use research_agent::types::{AppError, Result, SearchResult};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock LLM client with a canned reply.
///
/// ```ignore
/// let client = MockLLMClient::new("Broaden the query.");
/// let client = MockLLMClient::failing();
/// ```
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
    calls: AtomicUsize,
}

impl MockLLMClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: String::new(),
            should_fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, _system: &str, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Vocabulary of the keyword embedder, one dimension per word.
pub const KEYWORDS: &[&str] = &["ai", "papers", "cooking", "recipes"];

/// Embeds text as keyword counts over [`KEYWORDS`], plus a small constant so
/// no vector is all zeros.
pub struct KeywordEmbedder;

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .map(str::to_lowercase)
            .collect();
        Ok(KEYWORDS
            .iter()
            .map(|kw| words.iter().filter(|w| w == kw).count() as f32 + 0.01)
            .collect())
    }

    fn model_name(&self) -> &str {
        "keyword-embedder"
    }
}

/// Embedder that always errors.
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(AppError::Embedding("connection refused".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing-embedder"
    }
}

/// Search provider returning fixed results, truncated to the limit.
pub struct MockSearch {
    results: Vec<SearchResult>,
}

impl MockSearch {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self { results }
    }

    /// Two AI paper hits.
    pub fn papers() -> Self {
        Self::new(vec![
            paper("Attention Is All You Need", "Transformers for AI papers."),
            paper("Deep Residual Learning", "Residual AI networks."),
        ])
    }
}

pub fn paper(title: &str, snippet: &str) -> SearchResult {
    SearchResult {
        title: title.to_string(),
        url: Some(format!("https://openalex.org/{}", title.len())),
        snippet: snippet.to_string(),
        ..Default::default()
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        Ok(self.results.iter().take(limit).cloned().collect())
    }
}

/// Search provider that always errors.
pub struct FailingSearch;

#[async_trait]
impl SearchProvider for FailingSearch {
    fn name(&self) -> &str {
        "failing"
    }

    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<SearchResult>> {
        Err(AppError::Search("service unavailable".to_string()))
    }
}
