use super::tts_repository::{split_into_batches, TtsRepository};
use crate::domain::voice::{polly_voice_for_language, polly_voices, LanguageCode, PcmAudio, TtsProvider, VoiceProfile};
use async_trait::async_trait;
use aws_sdk_polly::{
    types::{Engine, OutputFormat, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;

/// AWS Polly has a limit of 3000 characters per request
const MAX_BATCH_SIZE: usize = 3000;
/// Highest rate Polly offers for PCM output
const SAMPLE_RATE: u32 = 16_000;

/// AWS Polly implementation of TTS repository
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
}

impl PollyTtsRepository {
    pub fn new(polly_client: Arc<PollyClient>) -> Self {
        Self { polly_client }
    }

    /// Call AWS Polly to synthesize a single text batch
    async fn call_polly(&self, text: &str, voice: &str) -> Result<PcmAudio, String> {
        let voice_id = VoiceId::from(voice);
        let engine = Engine::Neural;

        tracing::debug!(
            voice = voice,
            engine = ?engine,
            output_format = "Pcm",
            text_length = text.len(),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(text)
            .voice_id(voice_id)
            .output_format(OutputFormat::Pcm)
            .sample_rate(SAMPLE_RATE.to_string())
            .engine(engine.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    error_display = %e,
                    voice = voice,
                    engine = ?engine,
                    text_length = text.len(),
                    "AWS Polly synthesize_speech failed"
                );
                format!("AWS Polly error: {}", e)
            })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            format!("Failed to read audio stream: {}", e)
        })?;

        Ok(PcmAudio::from_le_bytes(&audio_stream.into_bytes(), SAMPLE_RATE))
    }
}

#[async_trait]
impl TtsRepository for PollyTtsRepository {
    fn provider(&self) -> TtsProvider {
        TtsProvider::Polly
    }

    fn voices(&self) -> Vec<VoiceProfile> {
        polly_voices()
    }

    fn default_voice(&self, language: LanguageCode) -> String {
        polly_voice_for_language(language).to_string()
    }

    async fn synthesize(&self, text: &str, voice: &str, language: LanguageCode) -> Result<PcmAudio, String> {
        let start_time = std::time::Instant::now();

        let batches = split_into_batches(text, MAX_BATCH_SIZE);
        let mut audio = PcmAudio::new(Vec::new(), SAMPLE_RATE);
        for (index, batch) in batches.iter().enumerate() {
            let chunk = self.call_polly(batch, voice).await?;
            audio.extend(chunk).map_err(|e| e.to_string())?;
            tracing::debug!(batch_index = index, batch_size = batch.len(), "Batch synthesized and merged");
        }

        tracing::info!(
            provider = "polly",
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
        match self.polly_client.describe_voices().send().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "AWS Polly health check failed");
                false
            }
        }
    }
}
