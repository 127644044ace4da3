use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One news or search result, as used for prompting.
/// Only its citation survives past script composition.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceItem {
    pub title: String,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub snippet: String,
    /// Topic the item was collected for
    pub topic: String,
}

/// What a bulletin response cites for each item it was built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub title: String,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
}

impl From<&SourceItem> for SourceCitation {
    fn from(item: &SourceItem) -> Self {
        Self {
            title: item.title.clone(),
            url: item.url.clone(),
            source: item.source.clone(),
            published_at: item.published_at,
        }
    }
}

/// Coarse rating of how much material the collectors found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsQuality {
    High,
    Medium,
    Low,
    None,
}

impl NewsQuality {
    pub fn from_item_count(count: usize) -> Self {
        match count {
            0 => NewsQuality::None,
            1..=2 => NewsQuality::Low,
            3..=5 => NewsQuality::Medium,
            _ => NewsQuality::High,
        }
    }
}
