use super::tts_repository::{split_into_batches, TtsRepository};
use crate::domain::voice::{openai_voices, LanguageCode, PcmAudio, TtsProvider, VoiceProfile};
use async_openai::{
    config::OpenAIConfig,
    types::{CreateSpeechRequest, SpeechModel, SpeechResponseFormat, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI has a limit of 4096 characters per request
const MAX_BATCH_SIZE: usize = 4096;
/// Raw PCM from the speech endpoint is 24 kHz mono 16-bit little endian
const SAMPLE_RATE: u32 = 24_000;

/// OpenAI TTS implementation of TTS repository
pub struct OpenAiTtsRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiTtsRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    fn speech_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }

    fn parse_voice(voice: &str) -> Option<Voice> {
        match voice.to_lowercase().as_str() {
            "alloy" => Some(Voice::Alloy),
            "echo" => Some(Voice::Echo),
            "fable" => Some(Voice::Fable),
            "onyx" => Some(Voice::Onyx),
            "nova" => Some(Voice::Nova),
            "shimmer" => Some(Voice::Shimmer),
            _ => None,
        }
    }

    /// Call OpenAI TTS API to synthesize a single text batch
    async fn call_openai(&self, text: &str, voice: Voice) -> Result<PcmAudio, String> {
        tracing::debug!(
            model = %self.model,
            voice = ?voice,
            text_length = text.len(),
            "Calling OpenAI TTS API"
        );

        let request = CreateSpeechRequest {
            model: self.speech_model(),
            input: text.to_string(),
            voice,
            response_format: Some(SpeechResponseFormat::Pcm),
            speed: None,
        };

        let response = self.client.audio().speech(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = %self.model,
                text_length = text.len(),
                "OpenAI TTS API call failed"
            );
            format!("OpenAI TTS error: {}", e)
        })?;

        Ok(PcmAudio::from_le_bytes(&response.bytes, SAMPLE_RATE))
    }
}

#[async_trait]
impl TtsRepository for OpenAiTtsRepository {
    fn provider(&self) -> TtsProvider {
        TtsProvider::OpenAi
    }

    fn voices(&self) -> Vec<VoiceProfile> {
        openai_voices()
    }

    /// OpenAI voices are multilingual; pick by character per language
    fn default_voice(&self, language: LanguageCode) -> String {
        match language {
            LanguageCode::English => "alloy",
            LanguageCode::Spanish => "echo",
            LanguageCode::French => "nova",
            LanguageCode::German => "onyx",
            LanguageCode::Italian => "fable",
            LanguageCode::Portuguese => "shimmer",
        }
        .to_string()
    }

    async fn synthesize(&self, text: &str, voice: &str, language: LanguageCode) -> Result<PcmAudio, String> {
        let start_time = std::time::Instant::now();
        let voice_enum = Self::parse_voice(voice).ok_or_else(|| format!("Unknown OpenAI voice '{}'", voice))?;

        let batches = split_into_batches(text, MAX_BATCH_SIZE);
        let mut audio = PcmAudio::new(Vec::new(), SAMPLE_RATE);
        for (index, batch) in batches.iter().enumerate() {
            let chunk = self.call_openai(batch, voice_enum.clone()).await?;
            audio.extend(chunk).map_err(|e| e.to_string())?;
            tracing::debug!(batch_index = index, batch_size = batch.len(), "Batch synthesized and merged");
        }

        tracing::info!(
            provider = "openai",
            model = %self.model,
            voice = voice,
            language = %language,
            latency_ms = start_time.elapsed().as_millis() as u64,
            characters_count = text.len(),
            batch_count = batches.len(),
            audio_seconds = %format!("{:.2}", audio.duration_seconds()),
            "TTS synthesis completed"
        );

        Ok(audio)
    }

    async fn check_health(&self) -> bool {
        match self.client.models().list().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "OpenAI health check failed");
                false
            }
        }
    }
}
