//! OpenAlex works search.
//!
//! Searches abstracts first and retries with a title search when nothing
//! comes back. Abstracts arrive as an inverted index (word -> positions)
//! and are rebuilt into plain text.

use super::SearchProvider;
use crate::types::{AppError, Result, SearchResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

pub const DEFAULT_OPENALEX_URL: &str = "https://api.openalex.org";

const NO_ABSTRACT: &str = "(No abstract available)";

#[derive(Debug, Deserialize)]
struct WorksPage {
    #[serde(default)]
    results: Vec<Work>,
}

#[derive(Debug, Deserialize)]
struct Work {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    abstract_inverted_index: Option<HashMap<String, Vec<usize>>>,
}

/// Rebuild abstract text from OpenAlex's inverted index, ordering words by position.
pub fn reconstruct_abstract(index: &HashMap<String, Vec<usize>>) -> String {
    let mut by_position = BTreeMap::new();
    for (word, positions) in index {
        for &pos in positions {
            by_position.insert(pos, word.as_str());
        }
    }
    by_position.into_values().collect::<Vec<_>>().join(" ")
}

pub struct OpenAlexSearch {
    http: reqwest::Client,
    base_url: String,
}

impl OpenAlexSearch {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn search_field(&self, field: &str, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let filter = format!("{}.search:{}", field, query);
        let per_page = limit.to_string();

        let response = self
            .http
            .get(format!("{}/works", self.base_url))
            .query(&[("filter", filter.as_str()), ("per-page", per_page.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Search(format!("OpenAlex request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::Search(format!("OpenAlex returned an error: {}", e)))?;

        let page: WorksPage = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Malformed OpenAlex response: {}", e)))?;

        Ok(page
            .results
            .into_iter()
            .map(|work| SearchResult {
                title: work.display_name.unwrap_or_default(),
                url: Some(work.id.unwrap_or_default()),
                path: None,
                snippet: work
                    .abstract_inverted_index
                    .as_ref()
                    .filter(|idx| !idx.is_empty())
                    .map(reconstruct_abstract)
                    .unwrap_or_else(|| NO_ABSTRACT.to_string()),
            })
            .collect())
    }
}

#[async_trait]
impl SearchProvider for OpenAlexSearch {
    fn name(&self) -> &str {
        "openalex"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let results = self.search_field("abstract", query, limit).await?;
        if !results.is_empty() {
            return Ok(results);
        }

        tracing::debug!(query, "No abstract matches, retrying with title search");
        self.search_field("title", query, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconstruct_abstract_orders_by_position() {
        let mut index = HashMap::new();
        index.insert("attention".to_string(), vec![0]);
        index.insert("is".to_string(), vec![1]);
        index.insert("all".to_string(), vec![2]);
        index.insert("you".to_string(), vec![3]);
        index.insert("need".to_string(), vec![4]);
        assert_eq!(reconstruct_abstract(&index), "attention is all you need");
    }

    #[test]
    fn test_reconstruct_abstract_repeated_words() {
        let mut index = HashMap::new();
        index.insert("the".to_string(), vec![0, 2]);
        index.insert("cat".to_string(), vec![1]);
        index.insert("hat".to_string(), vec![3]);
        assert_eq!(reconstruct_abstract(&index), "the cat the hat");
    }
}
