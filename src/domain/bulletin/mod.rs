pub mod error;
pub mod metrics;
pub mod model;
pub mod preset;
pub mod progress;
pub mod service;

pub use error::BulletinServiceError;
pub use model::BulletinParams;
pub use metrics::{DetailedMetrics, GenerationMetrics, GenerationRecord, MetricsSummary, PresetMetrics};
pub use preset::{Preset, PresetSettings};
pub use progress::{GenerationStep, NoProgress, ProgressSink};
pub use service::{BulletinService, BulletinServiceApi, DependencyHealth};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::sources::{NewsQuality, SourceCitation};
use crate::domain::voice::{LanguageCode, TtsProvider};

/// Request for POST /generate
///
/// Every field is optional at the wire level so that a missing `topics`
/// is reported as a validation error rather than a deserialization one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateBulletinRequest {
    #[serde(default)]
    pub topics: Option<Vec<String>>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
    /// Minutes
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub preset: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioInfo {
    pub filename: String,
    pub download_url: String,
    pub duration_seconds: f64,
    pub provider: TtsProvider,
}

/// Response for POST /generate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletinResponse {
    pub id: Uuid,
    pub script: String,
    pub word_count: usize,
    /// Words the whole script should have at the voice's rate
    pub target_words: usize,
    /// Share of `target_words` left for the body once intro and outro are spoken
    pub body_target_words: usize,
    pub attempts: u32,
    pub retries: u32,
    pub fallback_applied: bool,
    pub no_news: bool,
    pub sources: Vec<SourceCitation>,
    pub audio: AudioInfo,
    pub duration_requested_minutes: f64,
    pub duration_actual_minutes: f64,
    /// Percent, 100 means the audio matches the requested duration exactly
    pub timing_accuracy: f64,
    pub news_quality: NewsQuality,
    pub language_detected: Option<LanguageCode>,
    pub preset: Preset,
    pub cached: bool,
    pub warnings: Vec<String>,
    pub generation_time_ms: u64,
}
