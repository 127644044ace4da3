use crate::domain::voice::{LanguageCode, PcmAudio, TtsProvider, VoiceProfile};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([.!?]+\s+)").expect("valid regex"));

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (AWS Polly, OpenAI, ElevenLabs)
///
/// Implementations are responsible for:
/// - Handling provider-specific text length limitations
/// - Splitting text into batches if needed
/// - Merging audio chunks into a single PCM stream
#[async_trait]
pub trait TtsRepository: Send + Sync {
    fn provider(&self) -> TtsProvider;

    /// Voices this provider can narrate with
    fn voices(&self) -> Vec<VoiceProfile>;

    /// Voice used when the request names none (or one this provider lacks)
    fn default_voice(&self, language: LanguageCode) -> String;

    /// Synthesize text as raw mono 16-bit PCM
    ///
    /// # Errors
    /// Returns error if synthesis fails or provider is unavailable
    async fn synthesize(&self, text: &str, voice: &str, language: LanguageCode) -> Result<PcmAudio, String>;

    async fn check_health(&self) -> bool;
}

/// Split text into batches that respect sentence boundaries.
/// Each batch is at most `max_batch_size` bytes; text without usable
/// boundaries is split by characters.
pub fn split_into_batches(text: &str, max_batch_size: usize) -> Vec<String> {
    if text.len() <= max_batch_size {
        return vec![text.to_string()];
    }

    let mut batches = Vec::new();
    let mut current_batch = String::new();
    let mut last_end = 0;

    for mat in SENTENCE_END.find_iter(text) {
        let sentence = &text[last_end..mat.end()];

        if !current_batch.is_empty() && current_batch.len() + sentence.len() > max_batch_size {
            batches.push(current_batch.trim().to_string());
            current_batch = String::new();
        }

        if sentence.len() > max_batch_size {
            batches.extend(hard_split(sentence, max_batch_size));
        } else {
            current_batch.push_str(sentence);
        }
        last_end = mat.end();
    }

    // Remaining text after the last sentence boundary
    if last_end < text.len() {
        let remaining = &text[last_end..];

        if !current_batch.is_empty() && current_batch.len() + remaining.len() > max_batch_size {
            batches.push(current_batch.trim().to_string());
            current_batch = String::new();
        }

        if remaining.len() > max_batch_size {
            batches.extend(hard_split(remaining, max_batch_size));
        } else {
            current_batch.push_str(remaining);
        }
    }

    if !current_batch.trim().is_empty() {
        batches.push(current_batch.trim().to_string());
    }

    batches.retain(|b| !b.is_empty());
    batches
}

fn hard_split(text: &str, max_batch_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut chunk = String::new();
    for c in text.chars() {
        if chunk.len() + c.len_utf8() > max_batch_size {
            chunks.push(std::mem::take(&mut chunk));
        }
        chunk.push(c);
    }
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
    chunks
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}
