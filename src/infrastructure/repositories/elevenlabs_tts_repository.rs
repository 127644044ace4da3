use super::tts_repository::{split_into_batches, TtsRepository};
use crate::domain::voice::{elevenlabs_voices, LanguageCode, PcmAudio, TtsProvider, VoiceProfile};
use async_trait::async_trait;
use serde::Serialize;

const BASE_URL: &str = "https://api.elevenlabs.io/v1";
/// ElevenLabs accepts up to 5000 characters per request
const MAX_BATCH_SIZE: usize = 5000;
const SAMPLE_RATE: u32 = 22_050;
/// Rachel
const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// ElevenLabs implementation of TTS repository
pub struct ElevenLabsTtsRepository {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

impl ElevenLabsTtsRepository {
    pub fn new(http: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            http,
            api_key,
            model,
            base_url: BASE_URL.to_string(),
        }
    }

    async fn call_elevenlabs(&self, text: &str, voice_id: &str) -> Result<PcmAudio, String> {
        let url = format!(
            "{}/text-to-speech/{}?output_format=pcm_{}",
            self.base_url,
            urlencoding::encode(voice_id),
            SAMPLE_RATE
        );

        let response = self
            .http
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&SpeechRequest {
                text,
                model_id: &self.model,
                voice_settings: VoiceSettings {
                    stability: 0.5,
                    similarity_boost: 0.75,
                },
            })
            .send()
            .await
            .map_err(|e| format!("ElevenLabs request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                voice_id = voice_id,
                text_length = text.len(),
                detail = %detail.chars().take(200).collect::<String>(),
                "ElevenLabs TTS call failed"
            );
            return Err(format!("ElevenLabs returned status {}", status));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| format!("Failed to read ElevenLabs audio: {}", e))?;

        Ok(PcmAudio::from_le_bytes(&bytes, SAMPLE_RATE))
    }
}

#[async_trait]
impl TtsRepository for ElevenLabsTtsRepository {
    fn provider(&self) -> TtsProvider {
        TtsProvider::ElevenLabs
    }

    fn voices(&self) -> Vec<VoiceProfile> {
        elevenlabs_voices()
    }

    /// The multilingual model speaks every supported language with any voice
    fn default_voice(&self, _language: LanguageCode) -> String {
        DEFAULT_VOICE_ID.to_string()
    }

    async fn synthesize(&self, text: &str, voice: &str, language: LanguageCode) -> Result<PcmAudio, String> {
        let start_time = std::time::Instant::now();

        let batches = split_into_batches(text, MAX_BATCH_SIZE);
        let mut audio = PcmAudio::new(Vec::new(), SAMPLE_RATE);
        for batch in &batches {
            let chunk = self.call_elevenlabs(batch, voice).await?;
            audio.extend(chunk).map_err(|e| e.to_string())?;
        }

        tracing::info!(
            provider = "elevenlabs",
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
        let result = self
            .http
            .get(format!("{}/user", self.base_url))
            .header("xi-api-key", &self.api_key)
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!(error = %e, "ElevenLabs health check failed");
                false
            }
        }
    }
}
