use async_trait::async_trait;
use chrono::{Duration, Utc};
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use newscast_backend::domain::sources::SourceItem;
use newscast_backend::domain::voice::{openai_voices, LanguageCode, PcmAudio, TtsProvider, VoiceProfile};
use newscast_backend::infrastructure::repositories::{
    CompletionRequest, LanguageModelRepository, NewsQuery, NewsRepository, TtsRepository,
};

/// Sample rate of the stub speech; low to keep test files small
pub const STUB_SAMPLE_RATE: u32 = 8_000;
/// Rate the stub speaker talks at; matches the default timing profile
pub const STUB_WPM: f64 = 150.0;

const VOCABULARY: [&str; 16] = [
    "the", "markets", "moved", "higher", "today", "as", "investors", "weighed", "fresh", "data", "on",
    "inflation", "and", "jobs", "across", "europe",
];

/// News source returning a few fresh items per query, or nothing at all
pub struct StubNews {
    pub items_per_query: usize,
    pub calls: AtomicUsize,
}

impl StubNews {
    pub fn new(items_per_query: usize) -> Arc<Self> {
        Arc::new(Self {
            items_per_query,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl NewsRepository for StubNews {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn search(&self, query: &NewsQuery) -> Result<Vec<SourceItem>, String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..self.items_per_query)
            .map(|i| SourceItem {
                title: format!("{} update {} from desk {}", query.topic, i, call),
                url: format!("https://news.example.com/{}/{}/{}", query.topic.replace(' ', "-"), call, i),
                source: "Example Wire".to_string(),
                published_at: Utc::now() - Duration::minutes(30 + i as i64),
                snippet: format!("Latest reporting on {} with figures and quotes.", query.topic),
                topic: query.topic.clone(),
            })
            .collect())
    }

    async fn check_health(&self) -> bool {
        true
    }
}

/// Language model that writes exactly the number of words it is asked for
pub struct ObedientModel {
    target: Regex,
    pub calls: AtomicUsize,
}

impl ObedientModel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            target: Regex::new(r"(?:exactly|must have) (\d+) words").unwrap(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LanguageModelRepository for ObedientModel {
    async fn complete(&self, request: CompletionRequest) -> Result<String, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let words: usize = self
            .target
            .captures(&request.prompt)
            .and_then(|c| c[1].parse().ok())
            .ok_or_else(|| "no target in prompt".to_string())?;
        Ok(english_words(words))
    }

    async fn check_health(&self) -> bool {
        true
    }
}

pub fn english_words(count: usize) -> String {
    let mut text = (0..count)
        .map(|i| VOCABULARY[i % VOCABULARY.len()])
        .collect::<Vec<_>>()
        .join(" ");
    text.push('.');
    text
}

/// Speech provider that "speaks" silence at a constant rate, or always fails
pub struct MetronomeSpeech {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl MetronomeSpeech {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TtsRepository for MetronomeSpeech {
    fn provider(&self) -> TtsProvider {
        TtsProvider::OpenAi
    }

    fn voices(&self) -> Vec<VoiceProfile> {
        openai_voices()
    }

    fn default_voice(&self, _language: LanguageCode) -> String {
        "alloy".to_string()
    }

    async fn synthesize(&self, text: &str, _voice: &str, _language: LanguageCode) -> Result<PcmAudio, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err("speech endpoint returned 503".to_string());
        }
        let words = text.split_whitespace().count() as f64;
        let samples = (words * 60.0 / STUB_WPM * STUB_SAMPLE_RATE as f64) as usize;
        Ok(PcmAudio::new(vec![0; samples], STUB_SAMPLE_RATE))
    }

    async fn check_health(&self) -> bool {
        !self.fail
    }
}
