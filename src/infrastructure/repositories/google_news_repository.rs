use super::news_repository::{NewsQuery, NewsRepository};
use crate::domain::sources::SourceItem;
use crate::domain::voice::LanguageCode;
use async_trait::async_trait;
use std::io::Cursor;

const BASE_URL: &str = "https://news.google.com/rss";

/// Google News RSS search. Needs no key.
pub struct GoogleNewsRepository {
    http: reqwest::Client,
    base_url: String,
}

impl GoogleNewsRepository {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, BASE_URL.to_string())
    }

    pub fn with_base_url(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    /// Edition parameters (hl, gl) per narration language
    fn edition(language: LanguageCode) -> (&'static str, &'static str) {
        match language {
            LanguageCode::English => ("en-US", "US"),
            LanguageCode::Spanish => ("es-419", "MX"),
            LanguageCode::French => ("fr", "FR"),
            LanguageCode::German => ("de", "DE"),
            LanguageCode::Italian => ("it", "IT"),
            LanguageCode::Portuguese => ("pt-BR", "BR"),
        }
    }

    fn search_url(&self, query: &NewsQuery) -> String {
        let (hl, gl) = Self::edition(query.language);
        let q = format!("{} when:{}h", query.query, query.recent_hours.max(1));
        format!(
            "{}/search?q={}&hl={}&gl={}&ceid={}:{}",
            self.base_url,
            urlencoding::encode(&q),
            hl,
            gl,
            gl,
            query.language.as_str()
        )
    }
}

/// Google News titles read "Headline - Publisher"
fn split_publisher(title: &str) -> (String, Option<String>) {
    match title.rsplit_once(" - ") {
        Some((headline, publisher)) if !headline.trim().is_empty() && !publisher.trim().is_empty() => {
            (headline.trim().to_string(), Some(publisher.trim().to_string()))
        }
        _ => (title.trim().to_string(), None),
    }
}

/// Parse an RSS/Atom document into source items, dropping entries without
/// a link or a publication time
pub fn parse_feed(bytes: &[u8], topic: &str, max_results: usize) -> Result<Vec<SourceItem>, String> {
    let feed = feed_rs::parser::parse(Cursor::new(bytes)).map_err(|e| format!("Feed parse error: {}", e))?;
    let feed_title = feed.title.map(|t| t.content).unwrap_or_default();

    let items = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let published_at = entry.published?;
            let url = entry.links.first().map(|l| l.href.clone())?;
            let raw_title = entry.title.map(|t| t.content).unwrap_or_default();
            let (title, publisher) = split_publisher(&raw_title);
            if title.is_empty() {
                return None;
            }

            // Try summary first, then content body
            let snippet = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .unwrap_or_default();

            Some(SourceItem {
                title,
                url,
                source: publisher.unwrap_or_else(|| feed_title.clone()),
                published_at,
                snippet,
                topic: topic.to_string(),
            })
        })
        .take(max_results)
        .collect();

    Ok(items)
}

#[async_trait]
impl NewsRepository for GoogleNewsRepository {
    fn name(&self) -> &'static str {
        "google_news"
    }

    async fn search(&self, query: &NewsQuery) -> Result<Vec<SourceItem>, String> {
        let url = self.search_url(query);
        tracing::debug!(query = %query.query, language = %query.language, "Calling Google News RSS");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Google News request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Google News returned status {}", response.status()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| format!("Failed to read Google News body: {}", e))?;

        parse_feed(&body, &query.topic, query.max_results)
    }

    async fn check_health(&self) -> bool {
        match self.http.get(&self.base_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!(error = %e, "Google News health check failed");
                false
            }
        }
    }
}
