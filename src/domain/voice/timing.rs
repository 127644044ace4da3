use serde::{Deserialize, Serialize};

use super::language::LanguageCode;

/// Plausible human speech rates, words per minute
pub const MIN_WPM: f64 = 110.0;
pub const MAX_WPM: f64 = 170.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("speech rate {wpm} wpm is outside the plausible range {min}-{max}")]
pub struct TimingProfileError {
    pub wpm: f64,
    pub min: f64,
    pub max: f64,
}

/// Words-per-minute estimate for a voice, used to turn minutes into words
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingProfile {
    wpm: f64,
}

impl TimingProfile {
    pub fn new(wpm: f64) -> Result<Self, TimingProfileError> {
        if !wpm.is_finite() || !(MIN_WPM..=MAX_WPM).contains(&wpm) {
            return Err(TimingProfileError {
                wpm,
                min: MIN_WPM,
                max: MAX_WPM,
            });
        }
        Ok(Self { wpm })
    }

    /// Profile from a rate measured on synthesized audio, pulled into range.
    /// Returns None for degenerate measurements (zero or non-finite).
    pub fn from_measurement(wpm: f64) -> Option<Self> {
        if !wpm.is_finite() || wpm <= 0.0 {
            return None;
        }
        Some(Self {
            wpm: wpm.clamp(MIN_WPM, MAX_WPM),
        })
    }

    pub fn wpm(&self) -> f64 {
        self.wpm
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    OpenAi,
    Polly,
    ElevenLabs,
}

impl TtsProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            TtsProvider::OpenAi => "openai",
            TtsProvider::Polly => "polly",
            TtsProvider::ElevenLabs => "elevenlabs",
        }
    }
}

impl std::fmt::Display for TtsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A voice a provider can narrate with, plus its speaking rate
#[derive(Debug, Clone, Serialize)]
pub struct VoiceProfile {
    pub id: String,
    pub name: String,
    pub provider: TtsProvider,
    /// None means the voice is multilingual
    pub language: Option<LanguageCode>,
    pub description: String,
    pub timing: TimingProfile,
}

impl VoiceProfile {
    fn catalog_entry(
        id: &str,
        name: &str,
        provider: TtsProvider,
        language: Option<LanguageCode>,
        description: &str,
        wpm: f64,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            provider,
            language,
            description: description.to_string(),
            timing: TimingProfile { wpm },
        }
    }
}

/// Built-in catalogs. Rates were calibrated against measured output and all
/// sit inside MIN_WPM..=MAX_WPM (checked in tests).
pub fn openai_voices() -> Vec<VoiceProfile> {
    let p = TtsProvider::OpenAi;
    vec![
        VoiceProfile::catalog_entry("alloy", "Alloy", p, None, "Neutral, balanced", 150.0),
        VoiceProfile::catalog_entry("echo", "Echo", p, None, "Warm male voice", 148.0),
        VoiceProfile::catalog_entry("fable", "Fable", p, None, "Expressive narrator", 145.0),
        VoiceProfile::catalog_entry("onyx", "Onyx", p, None, "Deep, authoritative", 142.0),
        VoiceProfile::catalog_entry("nova", "Nova", p, None, "Bright female voice", 155.0),
        VoiceProfile::catalog_entry("shimmer", "Shimmer", p, None, "Clear articulation", 152.0),
    ]
}

pub fn elevenlabs_voices() -> Vec<VoiceProfile> {
    let p = TtsProvider::ElevenLabs;
    vec![
        VoiceProfile::catalog_entry("21m00Tcm4TlvDq8ikWAM", "Rachel", p, None, "Clear female voice", 140.0),
        VoiceProfile::catalog_entry("2EiwWnXFnvU5JabPnv8n", "Clyde", p, None, "Professional male voice", 135.0),
        VoiceProfile::catalog_entry("CwhRBWXzGAHq8TQ4Fs17", "Roger", p, None, "Confident male voice", 145.0),
        VoiceProfile::catalog_entry("EXAVITQu4vr4xnSDxMaL", "Sarah", p, None, "Soft female voice", 138.0),
    ]
}

pub fn polly_voices() -> Vec<VoiceProfile> {
    let p = TtsProvider::Polly;
    use LanguageCode::*;
    vec![
        VoiceProfile::catalog_entry("Joanna", "Joanna", p, Some(English), "US English, neural", 155.0),
        VoiceProfile::catalog_entry("Matthew", "Matthew", p, Some(English), "US English, neural", 152.0),
        VoiceProfile::catalog_entry("Lupe", "Lupe", p, Some(Spanish), "US Spanish, neural", 150.0),
        VoiceProfile::catalog_entry("Lea", "Léa", p, Some(French), "French, neural", 148.0),
        VoiceProfile::catalog_entry("Vicki", "Vicki", p, Some(German), "German, neural", 140.0),
        VoiceProfile::catalog_entry("Bianca", "Bianca", p, Some(Italian), "Italian, neural", 150.0),
        VoiceProfile::catalog_entry("Ines", "Inês", p, Some(Portuguese), "European Portuguese, neural", 145.0),
    ]
}
