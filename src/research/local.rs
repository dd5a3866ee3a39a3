//! Local notes search.
//!
//! Walks a notes directory (respecting `.gitignore`) and ranks Markdown and
//! text files by how many query terms they contain.

use super::SearchProvider;
use crate::types::{AppError, Result, SearchResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

const NOTE_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];
const SNIPPET_CHARS: usize = 280;

pub struct LocalNotesSearch {
    root: PathBuf,
}

impl LocalNotesSearch {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

fn query_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn note_title(path: &Path, content: &str) -> String {
    content
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default()
        })
}

fn snippet_around(content: &str, term: &str) -> String {
    let lower = content.to_lowercase();
    let start_byte = lower.find(term).unwrap_or(0);
    // Lowercasing can shift byte offsets; fall back to the start of the note.
    let start_byte = if content.is_char_boundary(start_byte) {
        start_byte
    } else {
        0
    };
    let line_start = content[..start_byte].rfind('\n').map(|i| i + 1).unwrap_or(0);

    let text = content[line_start..]
        .lines()
        .map(|line| strip_heading(line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n");
    let snippet: String = text.chars().take(SNIPPET_CHARS).collect();
    snippet.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `# Title` becomes `Title`; `#hashtag` is left alone.
fn strip_heading(line: &str) -> &str {
    let rest = line.trim_start_matches('#');
    if rest.len() < line.len() && (rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        rest
    } else {
        line
    }
}

fn scan(root: &Path, terms: &[String], limit: usize) -> Result<Vec<SearchResult>> {
    if !root.is_dir() {
        return Err(AppError::Search(format!(
            "Notes directory not found: {}",
            root.display()
        )));
    }

    let mut scored: Vec<(usize, SearchResult)> = Vec::new();
    for entry in ignore::WalkBuilder::new(root).hidden(false).build().flatten() {
        let path = entry.path();
        let is_note = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| NOTE_EXTENSIONS.contains(&e.to_lowercase().as_str()));
        if !path.is_file() || !is_note {
            continue;
        }

        let Ok(content) = std::fs::read_to_string(path) else {
            continue;
        };
        let lower = content.to_lowercase();
        let hits = terms.iter().filter(|t| lower.contains(t.as_str())).count();
        if hits == 0 {
            continue;
        }

        let first_term = terms
            .iter()
            .find(|t| lower.contains(t.as_str()))
            .map(String::as_str)
            .unwrap_or("");
        scored.push((
            hits,
            SearchResult {
                title: note_title(path, &content),
                url: None,
                path: Some(path.display().to_string()),
                snippet: snippet_around(&content, first_term),
            },
        ));
    }

    // Ties are broken by path.
    scored.sort_by(|a, b| a.1.path.cmp(&b.1.path));
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(scored.into_iter().take(limit).map(|(_, r)| r).collect())
}

#[async_trait]
impl SearchProvider for LocalNotesSearch {
    fn name(&self) -> &str {
        "local_notes"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let terms = query_terms(query);
        if terms.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let root = self.root.clone();
        tokio::task::spawn_blocking(move || scan(&root, &terms, limit))
            .await
            .map_err(|e| AppError::Internal(format!("Notes scan panicked: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn notes_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("transformers.md"),
            "# Transformer notes\n\nAttention layers replace recurrence in transformer models.\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("rl.txt"),
            "Reinforcement learning with transformer policies.\n",
        )
        .unwrap();
        fs::write(dir.path().join("ignored.rs"), "fn transformer() {}").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_ranks_by_term_hits() {
        let dir = notes_dir();
        let search = LocalNotesSearch::new(dir.path());

        let results = search.search("attention transformer", 5).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Transformer notes");
        assert_eq!(results[1].title, "rl");
        assert!(results[0].path.as_ref().unwrap().ends_with("transformers.md"));
    }

    #[tokio::test]
    async fn test_respects_limit_and_empty_query() {
        let dir = notes_dir();
        let search = LocalNotesSearch::new(dir.path());

        assert_eq!(search.search("transformer", 1).await.unwrap().len(), 1);
        assert!(search.search("   ", 5).await.unwrap().is_empty());
    }

    #[test]
    fn test_snippet_drops_heading_markers() {
        let snippet = snippet_around("# Transformers\nNotes on transformers.\n## Depth\n", "transformers");
        assert_eq!(snippet, "Transformers Notes on transformers. Depth");
        assert_eq!(snippet_around("#ai notes on ai", "ai"), "#ai notes on ai");
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_error() {
        let search = LocalNotesSearch::new("/definitely/not/here");
        assert!(search.search("anything", 3).await.is_err());
    }
}
