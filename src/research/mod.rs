//! Search providers used by the researcher agent, and the topic watchlist.

pub mod local;
pub mod openalex;
pub mod watchlist;

use crate::types::{Result, SearchResult};
use async_trait::async_trait;

pub use local::LocalNotesSearch;
pub use openalex::{OpenAlexSearch, DEFAULT_OPENALEX_URL};
pub use watchlist::Watchlist;

/// Source of `{title, url/path, snippet}` hits for a query.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Up to `limit` results for `query`, best first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>>;
}
