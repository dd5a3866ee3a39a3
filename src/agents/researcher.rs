//! Researcher agent: gathers search results and condenses them into a digest.
//!
//! Search failures never surface to the caller. A failing or missing web
//! provider yields numbered stub results so the workflow can continue.

use super::event_log::{EventLog, MemoryEventLog};
use super::{message_sent, task_received, Agent, AgentStatus};
use crate::research::SearchProvider;
use crate::types::{AgentEvent, AgentRole, Message, SearchResult, Task};
use async_trait::async_trait;
use std::sync::Arc;

pub struct ResearcherAgent {
    web: Option<Arc<dyn SearchProvider>>,
    local: Option<Arc<dyn SearchProvider>>,
    events: Arc<dyn EventLog>,
}

impl Default for ResearcherAgent {
    fn default() -> Self {
        Self::new()
    }
}

fn web_stub(top_k: usize) -> Vec<SearchResult> {
    (1..=top_k)
        .map(|i| SearchResult {
            title: format!("Result {}", i),
            url: Some(format!("https://example.com/{}", i)),
            path: None,
            snippet: "Stub result".to_string(),
        })
        .collect()
}

fn local_stub(top_k: usize) -> Vec<SearchResult> {
    (1..=top_k)
        .map(|i| SearchResult {
            title: format!("Local Result {}", i),
            url: None,
            path: Some(format!("/path/to/file_{}.md", i)),
            snippet: "Stub local result".to_string(),
        })
        .collect()
}

impl ResearcherAgent {
    /// Researcher with no providers: every search returns stubs.
    pub fn new() -> Self {
        Self {
            web: None,
            local: None,
            events: MemoryEventLog::shared(AgentRole::Researcher.as_str()),
        }
    }

    pub fn with_web_search(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.web = Some(provider);
        self
    }

    pub fn with_local_search(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.local = Some(provider);
        self
    }

    pub fn with_event_log(mut self, events: Arc<dyn EventLog>) -> Self {
        self.events = events;
        self
    }

    pub fn has_local_search(&self) -> bool {
        self.local.is_some()
    }

    /// Search the web provider for `query`.
    ///
    /// On provider error (or when none is configured) this records a
    /// `web_search_error` event and returns `top_k` stub results.
    pub async fn web_search(&self, query: &str, top_k: usize) -> Vec<SearchResult> {
        self.events.record(
            AgentEvent::new("web_search")
                .with("query", query)
                .with("top_k", top_k),
        );

        let outcome = match &self.web {
            Some(provider) => provider
                .search(query, top_k)
                .await
                .map(|results| (provider.name().to_string(), results))
                .map_err(|e| e.to_string()),
            None => Err("No web search provider configured".to_string()),
        };

        match outcome {
            Ok((_, results)) if results.is_empty() => {
                self.events.record(AgentEvent::new("web_search_no_results"));
                results
            }
            Ok((provider, results)) => {
                self.events.record(
                    AgentEvent::new("web_search_results")
                        .with("provider", provider)
                        .with("count", results.len()),
                );
                results
            }
            Err(error) => {
                tracing::warn!(query, "Web search failed, using stub results: {}", error);
                self.events
                    .record(AgentEvent::new("web_search_error").with("error", error));
                web_stub(top_k)
            }
        }
    }

    /// Search local notes for `query`, or return stubs when no notes
    /// provider is configured or it fails.
    pub async fn local_search(&self, query: &str, top_k: usize) -> Vec<SearchResult> {
        self.events.record(
            AgentEvent::new("local_search")
                .with("query", query)
                .with("top_k", top_k),
        );

        let Some(provider) = &self.local else {
            return local_stub(top_k);
        };

        match provider.search(query, top_k).await {
            Ok(results) => {
                self.events.record(
                    AgentEvent::new("local_search_results").with("count", results.len()),
                );
                results
            }
            Err(e) => {
                tracing::warn!(query, "Local search failed, using stub results: {}", e);
                self.events
                    .record(AgentEvent::new("local_search_error").with("error", e.to_string()));
                local_stub(top_k)
            }
        }
    }

    /// `"{title}: {snippet}"` per source, in input order, separated by a
    /// blank line.
    pub fn synthesize_digest(&self, sources: &[SearchResult]) -> String {
        self.events
            .record(AgentEvent::new("synthesize_digest").with("source_count", sources.len()));

        sources
            .iter()
            .map(|src| format!("{}: {}", src.title, src.snippet))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[async_trait]
impl Agent for ResearcherAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Researcher
    }

    async fn receive_task(&self, task: Task) {
        self.events.record(task_received(&task));
    }

    async fn send_message(&self, message: &Message) {
        self.events.record(message_sent(message));
    }

    async fn status(&self) -> AgentStatus {
        AgentStatus::new(AgentRole::Researcher).with("log_length", self.events.len())
    }

    fn events(&self) -> Vec<AgentEvent> {
        self.events.events()
    }
}
