use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use super::error::BulletinServiceError;
use super::preset::Preset;
use super::GenerateBulletinRequest;
use crate::domain::voice::LanguageCode;

pub const MAX_TOPICS: usize = 10;
pub const MAX_TOPIC_CHARS: usize = 200;
pub const MAX_TONE_CHARS: usize = 100;
pub const MIN_MINUTES: f64 = 1.0;
pub const MAX_MINUTES: f64 = 30.0;

const DEFAULT_MINUTES: f64 = 5.0;
const DEFAULT_TONE: &str = "professional";

/// A validated generation request
#[derive(Debug, Clone, PartialEq)]
pub struct BulletinParams {
    pub topics: Vec<String>,
    pub language: LanguageCode,
    pub voice: Option<String>,
    pub minutes: f64,
    pub tone: String,
    pub preset: Preset,
}

impl BulletinParams {
    pub fn from_request(request: GenerateBulletinRequest, default_preset: Preset) -> Result<Self, BulletinServiceError> {
        let invalid = |msg: String| BulletinServiceError::Invalid(msg);

        let topics: Vec<String> = request
            .topics
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.trim().to_string())
            .collect();
        if topics.is_empty() {
            return Err(invalid("topics must contain at least one topic".to_string()));
        }
        if topics.len() > MAX_TOPICS {
            return Err(invalid(format!("at most {} topics are allowed", MAX_TOPICS)));
        }
        if topics.iter().any(|t| t.is_empty()) {
            return Err(invalid("topics must not be empty strings".to_string()));
        }
        if let Some(long) = topics.iter().find(|t| t.chars().count() > MAX_TOPIC_CHARS) {
            return Err(invalid(format!(
                "topic '{}...' exceeds {} characters",
                long.chars().take(20).collect::<String>(),
                MAX_TOPIC_CHARS
            )));
        }

        let minutes = request.duration.unwrap_or(DEFAULT_MINUTES);
        if !minutes.is_finite() || !(MIN_MINUTES..=MAX_MINUTES).contains(&minutes) {
            return Err(invalid(format!(
                "duration must be between {} and {} minutes",
                MIN_MINUTES, MAX_MINUTES
            )));
        }

        let language = match request.language.as_deref().map(str::trim) {
            None | Some("") => LanguageCode::English,
            Some(raw) => LanguageCode::parse(raw).ok_or_else(|| {
                invalid(format!(
                    "unsupported language '{}', expected one of English, Spanish, French, German, Italian, Portuguese",
                    raw
                ))
            })?,
        };

        let tone = request
            .tone
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TONE.to_string());
        if tone.chars().count() > MAX_TONE_CHARS {
            return Err(invalid(format!("tone exceeds {} characters", MAX_TONE_CHARS)));
        }

        let preset = match request.preset.as_deref().map(str::trim) {
            None | Some("") => default_preset,
            Some(raw) => raw.parse().map_err(invalid)?,
        };

        Ok(Self {
            topics,
            language,
            voice: request.voice.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()),
            minutes,
            tone,
            preset,
        })
    }

    /// Fingerprint of everything that shapes the bulletin, scoped to one UTC day
    pub fn cache_key(&self, voice_id: &str, date: NaiveDate) -> String {
        let mut topics: Vec<String> = self.topics.iter().map(|t| t.to_lowercase()).collect();
        topics.sort();
        topics.dedup();

        let mut hasher = Sha256::new();
        hasher.update(topics.join("\u{1f}"));
        hasher.update([0x1e]);
        hasher.update(self.language.as_str());
        hasher.update([0x1e]);
        hasher.update(voice_id.to_lowercase());
        hasher.update([0x1e]);
        hasher.update(format!("{:.2}", self.minutes));
        hasher.update([0x1e]);
        hasher.update(self.tone.to_lowercase());
        hasher.update([0x1e]);
        hasher.update(self.preset.as_str());
        hasher.update([0x1e]);
        hasher.update(date.format("%Y-%m-%d").to_string());
        hex::encode(hasher.finalize())
    }
}

/// 100 when the audio is exactly as long as requested, falling linearly to 0
pub fn timing_accuracy(requested_seconds: f64, actual_seconds: f64) -> f64 {
    if requested_seconds <= 0.0 {
        return 0.0;
    }
    let accuracy = (1.0 - (actual_seconds - requested_seconds).abs() / requested_seconds) * 100.0;
    (accuracy.max(0.0) * 10.0).round() / 10.0
}
