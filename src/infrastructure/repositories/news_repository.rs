use crate::domain::sources::SourceItem;
use crate::domain::voice::LanguageCode;
use async_trait::async_trait;

/// One provider call: a single expanded query for a single topic
#[derive(Debug, Clone)]
pub struct NewsQuery {
    pub topic: String,
    pub query: String,
    pub language: LanguageCode,
    pub max_results: usize,
    pub recent_hours: u32,
}

/// Repository for recent news lookups.
/// Abstracts the underlying feed or search API (Google News RSS, Tavily, etc.)
///
/// Implementations must only return items with a known publication time;
/// entries without one are dropped at this boundary.
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &'static str;

    async fn search(&self, query: &NewsQuery) -> Result<Vec<SourceItem>, String>;

    async fn check_health(&self) -> bool;
}
