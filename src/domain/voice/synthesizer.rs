use std::sync::Arc;
use std::time::Instant;

use super::audio::{assemble_segments, AudioArtifact, PcmAudio};
use super::language::LanguageCode;
use super::timing::{TimingProfile, TtsProvider, VoiceProfile};
use crate::domain::script::NarrationScript;
use crate::infrastructure::repositories::TtsRepository;

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("no speech provider configured")]
    NoProviders,
    #[error("all speech providers failed: {0}")]
    AllProvidersFailed(String),
}

/// The voice a bulletin is narrated with and the rate used to size its script
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSelection {
    pub voice_id: String,
    /// None when the voice is not in any catalog
    pub provider: Option<TtsProvider>,
    pub timing: TimingProfile,
    pub warning: Option<String>,
}

/// Narrates scripts through an ordered list of providers, falling back to
/// the next one when a provider fails
pub struct VoiceSynthesizer {
    providers: Vec<Arc<dyn TtsRepository>>,
    default_voice: Option<String>,
    default_timing: TimingProfile,
}

impl VoiceSynthesizer {
    pub fn new(
        providers: Vec<Arc<dyn TtsRepository>>,
        default_voice: Option<String>,
        default_timing: TimingProfile,
    ) -> Self {
        Self {
            providers,
            default_voice,
            default_timing,
        }
    }

    pub fn voices(&self) -> Vec<VoiceProfile> {
        self.providers.iter().flat_map(|p| p.voices()).collect()
    }

    fn find_voice(&self, requested: &str) -> Option<VoiceProfile> {
        let requested = requested.trim();
        self.voices()
            .into_iter()
            .find(|v| v.id.eq_ignore_ascii_case(requested) || v.name.eq_ignore_ascii_case(requested))
    }

    /// Pick the narration voice: the requested one, else the configured
    /// default, else the primary provider's default for the language.
    /// Unknown voices fall back to the provider default with default timing.
    pub fn resolve_voice(&self, requested: Option<&str>, language: LanguageCode) -> VoiceSelection {
        let candidate = requested
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_voice.clone());

        if let Some(name) = candidate {
            if let Some(profile) = self.find_voice(&name) {
                return VoiceSelection {
                    voice_id: profile.id,
                    provider: Some(profile.provider),
                    timing: profile.timing,
                    warning: None,
                };
            }

            tracing::warn!(voice = %name, "Unknown voice, using provider default and default timing");
            return VoiceSelection {
                voice_id: self.primary_default_voice(language),
                provider: None,
                timing: self.default_timing,
                warning: Some(format!(
                    "unknown voice '{}', used the default voice at {} wpm",
                    name,
                    self.default_timing.wpm()
                )),
            };
        }

        let voice_id = self.primary_default_voice(language);
        match self.find_voice(&voice_id) {
            Some(profile) => VoiceSelection {
                voice_id: profile.id,
                provider: Some(profile.provider),
                timing: profile.timing,
                warning: None,
            },
            None => VoiceSelection {
                voice_id,
                provider: None,
                timing: self.default_timing,
                warning: None,
            },
        }
    }

    fn primary_default_voice(&self, language: LanguageCode) -> String {
        self.providers
            .first()
            .map(|p| p.default_voice(language))
            .unwrap_or_default()
    }

    /// The selected voice when it belongs to this provider, its default otherwise
    fn voice_for(&self, provider: &dyn TtsRepository, selection: &VoiceSelection, language: LanguageCode) -> String {
        let owns_voice = selection.provider == Some(provider.provider())
            || provider.voices().iter().any(|v| v.id == selection.voice_id);
        if owns_voice {
            selection.voice_id.clone()
        } else {
            provider.default_voice(language)
        }
    }

    /// Synthesize intro, body and outro and join them with the fixed paddings.
    /// Either every segment comes from one provider or that provider is skipped.
    pub async fn synthesize(
        &self,
        script: &NarrationScript,
        selection: &VoiceSelection,
        language: LanguageCode,
    ) -> Result<AudioArtifact, SynthesisError> {
        if self.providers.is_empty() {
            return Err(SynthesisError::NoProviders);
        }

        let mut failures = Vec::new();
        for provider in &self.providers {
            let voice = self.voice_for(provider.as_ref(), selection, language);
            let started = Instant::now();

            match self.synthesize_with(provider.as_ref(), script, &voice, language).await {
                Ok(artifact) => {
                    tracing::info!(
                        provider = %provider.provider(),
                        voice = %voice,
                        duration_seconds = %format!("{:.2}", artifact.duration_seconds),
                        sample_rate = artifact.sample_rate,
                        wav_bytes = artifact.wav.len(),
                        latency_ms = started.elapsed().as_millis() as u64,
                        "Bulletin audio assembled"
                    );
                    return Ok(artifact);
                }
                Err(e) => {
                    tracing::warn!(
                        provider = %provider.provider(),
                        voice = %voice,
                        error = %e,
                        "Speech provider failed, trying next"
                    );
                    failures.push(format!("{}: {}", provider.provider(), e));
                }
            }
        }

        Err(SynthesisError::AllProvidersFailed(failures.join("; ")))
    }

    async fn synthesize_with(
        &self,
        provider: &dyn TtsRepository,
        script: &NarrationScript,
        voice: &str,
        language: LanguageCode,
    ) -> Result<AudioArtifact, String> {
        let intro = Self::segment(provider, &script.intro, voice, language).await?;
        let body = Self::segment(provider, &script.body, voice, language).await?;
        let outro = Self::segment(provider, &script.outro, voice, language).await?;

        if body.samples.is_empty() {
            return Err("provider returned no audio for the bulletin body".to_string());
        }

        // Empty intro/outro segments still need the body's rate for padding
        let intro = Self::or_silence(intro, body.sample_rate);
        let outro = Self::or_silence(outro, body.sample_rate);

        let pcm = assemble_segments(intro, body, outro).map_err(|e| e.to_string())?;
        AudioArtifact::from_pcm(&pcm, provider.provider()).map_err(|e| e.to_string())
    }

    async fn segment(
        provider: &dyn TtsRepository,
        text: &str,
        voice: &str,
        language: LanguageCode,
    ) -> Result<PcmAudio, String> {
        if text.trim().is_empty() {
            return Ok(PcmAudio::new(Vec::new(), 0));
        }
        provider.synthesize(text, voice, language).await
    }

    fn or_silence(pcm: PcmAudio, sample_rate: u32) -> PcmAudio {
        if pcm.samples.is_empty() {
            PcmAudio::new(Vec::new(), sample_rate)
        } else {
            pcm
        }
    }

    /// Ready when at least one provider answers
    pub async fn check_health(&self) -> bool {
        for provider in &self.providers {
            if provider.check_health().await {
                return true;
            }
        }
        false
    }
}
