use super::news_repository::{NewsQuery, NewsRepository};
use crate::domain::sources::SourceItem;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://api.tavily.com";

/// Tavily news search. Only wired when an API key is configured.
pub struct TavilyNewsRepository {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    topic: &'static str,
    days: u32,
    max_results: usize,
    search_depth: &'static str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    title: String,
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    published_date: Option<String>,
}

impl TavilyNewsRepository {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self {
            http,
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }
}

/// Tavily reports dates as RFC 2822 or RFC 3339 depending on the source
fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|d| d.with_timezone(&Utc))
        .ok()
}

fn host_of(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_default()
}

fn into_items(response: SearchResponse, topic: &str) -> Vec<SourceItem> {
    response
        .results
        .into_iter()
        .filter_map(|result| {
            let published_at = result.published_date.as_deref().and_then(parse_published)?;
            Some(SourceItem {
                source: host_of(&result.url),
                title: result.title.trim().to_string(),
                url: result.url,
                published_at,
                snippet: result.content,
                topic: topic.to_string(),
            })
        })
        .collect()
}

#[async_trait]
impl NewsRepository for TavilyNewsRepository {
    fn name(&self) -> &'static str {
        "tavily"
    }

    async fn search(&self, query: &NewsQuery) -> Result<Vec<SourceItem>, String> {
        let request = SearchRequest {
            api_key: &self.api_key,
            query: &query.query,
            topic: "news",
            days: query.recent_hours.div_ceil(24).max(1),
            max_results: query.max_results,
            search_depth: "basic",
        };

        let response = self
            .http
            .post(format!("{}/search", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Tavily request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Tavily returned status {}", response.status()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| format!("Invalid Tavily response: {}", e))?;

        Ok(into_items(body, &query.topic))
    }

    async fn check_health(&self) -> bool {
        // Any HTTP answer means the API is reachable; searching would spend credits
        match self.http.get(&self.base_url).send().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Tavily health check failed");
                false
            }
        }
    }
}
