use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use html2text::from_read;
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use super::model::{NewsQuality, SourceItem};
use crate::domain::voice::LanguageCode;
use crate::infrastructure::repositories::{NewsQuery, NewsRepository};

pub const MAX_RELEVANCE: u32 = 10;

static PUBLISHER_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+[-–—|]\s+[^-–—|]{1,60}$").expect("valid regex"));
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://[^\s]+").expect("valid regex"));

/// How wide to search, derived from the active preset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectionPlan {
    pub queries_per_topic: usize,
    pub items_per_query: usize,
    pub max_items: usize,
    pub snippet_chars: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CollectionReport {
    /// Ranked, deduplicated and recent items, best first
    pub items: Vec<SourceItem>,
    pub total_calls: usize,
    pub failed_calls: usize,
    pub stale_dropped: usize,
    pub duplicates_dropped: usize,
}

impl CollectionReport {
    pub fn all_calls_failed(&self) -> bool {
        self.total_calls > 0 && self.failed_calls == self.total_calls
    }

    pub fn quality(&self) -> NewsQuality {
        NewsQuality::from_item_count(self.items.len())
    }

    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.all_calls_failed() {
            warnings.push("source feeds unreachable".to_string());
        } else if self.failed_calls > 0 {
            warnings.push(format!(
                "{} of {} source queries failed",
                self.failed_calls, self.total_calls
            ));
        }
        warnings
    }
}

/// Fans topic queries out over every news provider and merges the results
pub struct SourceCollector {
    providers: Vec<Arc<dyn NewsRepository>>,
    recent_hours: u32,
    max_fanout: usize,
}

impl SourceCollector {
    pub fn new(providers: Vec<Arc<dyn NewsRepository>>, recent_hours: u32, max_fanout: usize) -> Self {
        Self {
            providers,
            recent_hours,
            max_fanout: max_fanout.max(1),
        }
    }

    pub fn providers(&self) -> &[Arc<dyn NewsRepository>] {
        &self.providers
    }

    pub async fn collect(&self, topics: &[String], language: LanguageCode, plan: CollectionPlan) -> CollectionReport {
        let calls: Vec<(usize, Arc<dyn NewsRepository>, NewsQuery)> = topics
            .iter()
            .flat_map(|topic| {
                expand_queries(topic, plan.queries_per_topic)
                    .into_iter()
                    .map(move |query| (topic.clone(), query))
            })
            .flat_map(|(topic, query)| {
                self.providers.iter().map(move |provider| {
                    (
                        provider.clone(),
                        NewsQuery {
                            topic: topic.clone(),
                            query: query.clone(),
                            language,
                            max_results: plan.items_per_query,
                            recent_hours: self.recent_hours,
                        },
                    )
                })
            })
            .enumerate()
            .map(|(index, (provider, query))| (index, provider, query))
            .collect();

        let total_calls = calls.len();
        tracing::info!(
            topics = topics.len(),
            providers = self.providers.len(),
            total_calls,
            max_fanout = self.max_fanout,
            "Collecting sources"
        );

        // Futures are lazy, so building them up front keeps the fan-out bounded
        let queries: Vec<_> = calls.into_iter().map(run_query).collect();
        let mut results: Vec<(usize, Result<Vec<SourceItem>, String>)> = stream::iter(queries)
            .buffer_unordered(self.max_fanout)
            .collect()
            .await;

        // Completion order is arbitrary; merge in query order so the first
        // query's copy of a duplicate is the one kept
        results.sort_by_key(|(index, _)| *index);

        let mut failed_calls = 0;
        let mut merged = Vec::new();
        for (_, result) in results {
            match result {
                Ok(items) => merged.extend(items),
                Err(_) => failed_calls += 1,
            }
        }

        let now = Utc::now();
        let cutoff = now - Duration::hours(i64::from(self.recent_hours));
        let (recent, stale_dropped) = filter_recent(merged, cutoff);
        let (unique, duplicates_dropped) = dedupe(recent);
        let items = rank(unique, now, plan.max_items)
            .into_iter()
            .map(|mut item| {
                item.snippet = clean_snippet(&item.snippet, plan.snippet_chars);
                item
            })
            .collect::<Vec<_>>();

        tracing::info!(
            items = items.len(),
            total_calls,
            failed_calls,
            stale_dropped,
            duplicates_dropped,
            "Sources collected"
        );

        CollectionReport {
            items,
            total_calls,
            failed_calls,
            stale_dropped,
            duplicates_dropped,
        }
    }
}

pub fn expand_queries(topic: &str, count: usize) -> Vec<String> {
    let topic = topic.trim();
    [
        topic.to_string(),
        format!("{} latest news", topic),
        format!("{} breaking developments", topic),
    ]
    .into_iter()
    .take(count.clamp(1, 3))
    .collect()
}

/// Lowercase, publisher suffix ("Headline - Reuters") removed, punctuation
/// dropped, whitespace collapsed
pub fn normalize_title(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let stripped = PUBLISHER_SUFFIX.replace(&lowered, "");
    let words_only = NON_WORD.replace_all(&stripped, " ");
    WHITESPACE.replace_all(&words_only, " ").trim().to_string()
}

pub fn normalize_url(raw: &str) -> String {
    match reqwest::Url::parse(raw.trim()) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string().trim_end_matches('/').to_string()
        }
        Err(_) => raw.trim().trim_end_matches('/').to_lowercase(),
    }
}

/// One provider query, logged with its latency
async fn run_query(
    (index, provider, query): (usize, Arc<dyn NewsRepository>, NewsQuery),
) -> (usize, Result<Vec<SourceItem>, String>) {
    let started = Instant::now();
    let result = provider.search(&query).await;
    match &result {
        Ok(items) => tracing::debug!(
            provider = provider.name(),
            query = %query.query,
            items = items.len(),
            latency_ms = started.elapsed().as_millis() as u64,
            "Source query completed"
        ),
        Err(e) => tracing::warn!(
            provider = provider.name(),
            query = %query.query,
            error = %e,
            latency_ms = started.elapsed().as_millis() as u64,
            "Source query failed"
        ),
    }
    (index, result)
}

fn filter_recent(items: Vec<SourceItem>, cutoff: DateTime<Utc>) -> (Vec<SourceItem>, usize) {
    let before = items.len();
    let recent: Vec<_> = items.into_iter().filter(|item| item.published_at >= cutoff).collect();
    let dropped = before - recent.len();
    (recent, dropped)
}

/// Keep the first occurrence; an item is a duplicate when its normalized
/// title or its normalized URL was already seen. Blank titles and links
/// never match anything.
pub fn dedupe(items: Vec<SourceItem>) -> (Vec<SourceItem>, usize) {
    let mut titles = HashSet::new();
    let mut urls = HashSet::new();
    let mut unique = Vec::with_capacity(items.len());
    let mut dropped = 0;

    for item in items {
        let title = normalize_title(&item.title);
        let url = normalize_url(&item.url);
        let seen_title = !title.is_empty() && titles.contains(&title);
        let seen_url = !url.is_empty() && urls.contains(&url);
        if seen_title || seen_url {
            dropped += 1;
            continue;
        }
        titles.insert(title);
        urls.insert(url);
        unique.push(item);
    }

    (unique, dropped)
}

pub fn relevance(item: &SourceItem, now: DateTime<Utc>) -> u32 {
    let topic = item.topic.trim().to_lowercase();
    let mut score = 0;

    if !topic.is_empty() {
        if item.title.to_lowercase().contains(&topic) {
            score += 4;
        }
        if item.snippet.to_lowercase().contains(&topic) {
            score += 2;
        }
    }

    let age = now - item.published_at;
    if age <= Duration::hours(6) {
        score += 3;
    } else if age <= Duration::hours(24) {
        score += 2;
    }

    if item.snippet.chars().count() > 200 {
        score += 1;
    }

    score.min(MAX_RELEVANCE)
}

/// Best first; equal scores go to the more recent item
pub fn rank(items: Vec<SourceItem>, now: DateTime<Utc>, max_items: usize) -> Vec<SourceItem> {
    let mut scored: Vec<(u32, SourceItem)> = items.into_iter().map(|item| (relevance(&item, now), item)).collect();
    scored.sort_by(|(a_score, a), (b_score, b)| {
        b_score
            .cmp(a_score)
            .then_with(|| b.published_at.cmp(&a.published_at))
    });
    scored.into_iter().take(max_items).map(|(_, item)| item).collect()
}

/// Convert feed HTML to plain text, drop URLs, normalize whitespace and cap
/// the length at a word boundary
pub fn clean_snippet(text: &str, max_chars: usize) -> String {
    let plain_text = from_read(text.as_bytes(), usize::MAX);
    let without_urls = URL.replace_all(&plain_text, "");
    let normalized = WHITESPACE.replace_all(&without_urls, " ").trim().to_string();

    if normalized.chars().count() <= max_chars {
        return normalized;
    }

    let cut: String = normalized.chars().take(max_chars).collect();
    let cut = match cut.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => cut[..idx].to_string(),
        _ => cut,
    };
    format!("{}...", cut.trim_end_matches(|c: char| c.is_whitespace() || c == ',' || c == ';'))
}
