//! Persisted list of topics to check for new research.
//!
//! Stored as a JSON array of strings. Topics keep the order they were added
//! in and appear once.

use crate::types::{AppError, Result};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlist {
    path: PathBuf,
    topics: Vec<String>,
}

impl Watchlist {
    /// Read the watchlist at `path`. A missing file is an empty watchlist.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let topics = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<Vec<String>>(&raw).map_err(|e| {
                AppError::InvalidInput(format!("Corrupt watchlist {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(AppError::Internal(format!(
                    "Failed to read watchlist {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let mut watchlist = Self {
            path,
            topics: Vec::with_capacity(topics.len()),
        };
        for topic in topics {
            watchlist.add(&topic);
        }
        Ok(watchlist)
    }

    /// Add `topic`; returns false if it was blank or already watched.
    pub fn add(&mut self, topic: &str) -> bool {
        let topic = topic.trim();
        if topic.is_empty() || self.topics.iter().any(|t| t == topic) {
            return false;
        }
        self.topics.push(topic.to_string());
        true
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Write the watchlist back, creating parent directories.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Internal(format!("Failed to create watchlist directory: {}", e))
                })?;
            }
        }

        let raw = serde_json::to_string_pretty(&self.topics)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| {
            AppError::Internal(format!(
                "Failed to write watchlist {}: {}",
                self.path.display(),
                e
            ))
        })?;
        tracing::debug!(path = %self.path.display(), topics = self.topics.len(), "Saved watchlist");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let watchlist = Watchlist::load(dir.path().join("watchlist.json")).unwrap();
        assert!(watchlist.is_empty());
    }

    #[test]
    fn test_add_dedupes_and_saves_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("watchlist.json");

        let mut watchlist = Watchlist::load(&path).unwrap();
        assert!(watchlist.add("graph neural networks"));
        assert!(watchlist.add("  diffusion "));
        assert!(!watchlist.add("graph neural networks"));
        assert!(!watchlist.add("   "));
        watchlist.save().unwrap();

        let reloaded = Watchlist::load(&path).unwrap();
        assert_eq!(reloaded.topics(), ["graph neural networks", "diffusion"]);
        let raw: Vec<String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.json");
        std::fs::write(&path, "{\"not\": \"a list\"}").unwrap();
        assert!(matches!(Watchlist::load(&path), Err(AppError::InvalidInput(_))));
    }
}
