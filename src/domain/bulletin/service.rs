use super::error::BulletinServiceError;
use super::metrics::{DetailedMetrics, GenerationMetrics, GenerationRecord, MetricsSummary};
use super::model::{timing_accuracy, BulletinParams};
use super::preset::{Preset, PresetSettings};
use super::progress::{GenerationStep, NoProgress, ProgressSink};
use super::{AudioInfo, BulletinResponse, GenerateBulletinRequest};
use crate::domain::script::{
    count_words, target_words, template, DayPart, LengthReconciler, NarrationScript, ReconcileOutcome, ReconcilePath,
    ScriptBrief, MIN_TARGET_WORDS,
};
use crate::domain::sources::{CollectionReport, SourceCitation, SourceCollector};
use crate::domain::voice::{
    detect_language, AudioArtifact, LanguageCode, PcmAudio, TimingProfile, VoiceProfile, VoiceSelection,
    VoiceSynthesizer, INTRO_GAP, OUTRO_GAP,
};
use crate::infrastructure::cache::BulletinCache;
use crate::infrastructure::repositories::LanguageModelRepository;
use crate::infrastructure::storage::AudioStore;
use async_trait::async_trait;
use chrono::{Local, Timelike, Utc};
use lingua::LanguageDetector;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Reachability of each external collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DependencyHealth {
    pub sources: bool,
    pub llm: bool,
    pub tts: bool,
}

impl DependencyHealth {
    pub fn all_ready(&self) -> bool {
        self.sources && self.llm && self.tts
    }
}

pub struct BulletinService {
    collector: Arc<SourceCollector>,
    llm: Arc<dyn LanguageModelRepository>,
    synthesizer: Arc<VoiceSynthesizer>,
    store: Arc<AudioStore>,
    cache: Option<Arc<dyn BulletinCache>>,
    language_detector: LanguageDetector,
    default_preset: Preset,
    metrics: GenerationMetrics,
}

impl BulletinService {
    pub fn new(
        collector: Arc<SourceCollector>,
        llm: Arc<dyn LanguageModelRepository>,
        synthesizer: Arc<VoiceSynthesizer>,
        store: Arc<AudioStore>,
        cache: Option<Arc<dyn BulletinCache>>,
        language_detector: LanguageDetector,
        default_preset: Preset,
    ) -> Self {
        Self {
            collector,
            llm,
            synthesizer,
            store,
            cache,
            language_detector,
            default_preset,
            metrics: GenerationMetrics::new(),
        }
    }
}

#[async_trait]
pub trait BulletinServiceApi: Send + Sync {
    /// Generate a bulletin end to end
    ///
    /// This operation:
    /// - Validates the request
    /// - Serves today's cached bulletin for an identical request, if any
    /// - Collects and ranks recent sources
    /// - Reconciles a script to the time budget
    /// - Synthesizes and stores the audio (calibrating once more with `precise`)
    async fn generate(&self, request: GenerateBulletinRequest) -> Result<BulletinResponse, BulletinServiceError> {
        self.generate_with_progress(request, &NoProgress).await
    }

    /// Same as `generate`, reporting each pipeline stage to `progress`
    async fn generate_with_progress(
        &self,
        request: GenerateBulletinRequest,
        progress: &dyn ProgressSink,
    ) -> Result<BulletinResponse, BulletinServiceError>;

    /// Run request validation alone, so background jobs can reject early
    fn validate(&self, request: &GenerateBulletinRequest) -> Result<(), BulletinServiceError>;

    /// Raw WAV bytes of a stored bulletin
    async fn open_audio(&self, filename: &str) -> Result<Vec<u8>, BulletinServiceError>;

    fn voices(&self) -> Vec<VoiceProfile>;

    async fn dependency_health(&self) -> DependencyHealth;

    async fn metrics_summary(&self) -> MetricsSummary;

    async fn detailed_metrics(&self, recent: usize) -> DetailedMetrics;
}

#[async_trait]
impl BulletinServiceApi for BulletinService {
    async fn generate_with_progress(
        &self,
        request: GenerateBulletinRequest,
        progress: &dyn ProgressSink,
    ) -> Result<BulletinResponse, BulletinServiceError> {
        let started = Instant::now();

        // 1. Validate
        progress.report(GenerationStep::Validating).await;
        let params = BulletinParams::from_request(request, self.default_preset)?;

        let result = self.produce(&params, progress, started).await;
        self.record_outcome(&params, &result, started).await;
        if result.is_ok() {
            progress.report(GenerationStep::Completed).await;
        }
        result
    }

    fn validate(&self, request: &GenerateBulletinRequest) -> Result<(), BulletinServiceError> {
        BulletinParams::from_request(request.clone(), self.default_preset).map(|_| ())
    }

    async fn open_audio(&self, filename: &str) -> Result<Vec<u8>, BulletinServiceError> {
        Ok(self.store.open(filename).await?)
    }

    fn voices(&self) -> Vec<VoiceProfile> {
        self.synthesizer.voices()
    }

    async fn dependency_health(&self) -> DependencyHealth {
        let sources = async {
            for provider in self.collector.providers() {
                if provider.check_health().await {
                    return true;
                }
            }
            false
        };
        let (sources, llm, tts) = tokio::join!(sources, self.llm.check_health(), self.synthesizer.check_health());
        DependencyHealth { sources, llm, tts }
    }

    async fn metrics_summary(&self) -> MetricsSummary {
        self.metrics.summary().await
    }

    async fn detailed_metrics(&self, recent: usize) -> DetailedMetrics {
        self.metrics.detailed(recent).await
    }
}

impl BulletinService {
    /// Everything after validation: cache, sources, script, audio, storage
    async fn produce(
        &self,
        params: &BulletinParams,
        progress: &dyn ProgressSink,
        started: Instant,
    ) -> Result<BulletinResponse, BulletinServiceError> {
        let settings = params.preset.settings();
        let selection = self.synthesizer.resolve_voice(params.voice.as_deref(), params.language);

        tracing::info!(
            topics = ?params.topics,
            language = %params.language,
            minutes = params.minutes,
            preset = %params.preset,
            voice = %selection.voice_id,
            wpm = selection.timing.wpm(),
            "Bulletin generation request"
        );

        // 2. Check cache first (if enabled)
        let cache_key = params.cache_key(&selection.voice_id, Utc::now().date_naive());
        if let Some(cached) = self.cached(&cache_key).await {
            tracing::info!(id = %cached.id, filename = %cached.audio.filename, "Bulletin cache hit");
            return Ok(BulletinResponse {
                cached: true,
                generation_time_ms: started.elapsed().as_millis() as u64,
                ..cached
            });
        }

        // 3. Collect sources
        progress.report(GenerationStep::CollectingSources).await;
        let report = self
            .collector
            .collect(&params.topics, params.language, settings.collection_plan())
            .await;

        // 4. Reconcile the body against what remains after intro and outro
        progress.report(GenerationStep::WritingScript).await;
        let intro = template::intro(
            params.language,
            DayPart::from_hour(Local::now().hour()),
            params.minutes,
            &params.topics,
        );
        let outro = template::outro(params.language).to_string();
        let total_target = target_words(params.minutes, selection.timing);
        let body_target = body_target(total_target, &intro, &outro);

        let reconciler = LengthReconciler::new(self.llm.clone(), settings.reconciler_settings());
        let brief = ScriptBrief {
            topics: &params.topics,
            items: &report.items,
            language: params.language,
            tone: &params.tone,
        };
        let outcome = reconciler.reconcile(&brief, body_target).await;

        let mut stats = ReconcileStats::new(&outcome, total_target);
        let mut script = NarrationScript {
            intro,
            body: outcome.draft.text,
            outro,
        };

        // 5. Synthesize
        progress.report(GenerationStep::Synthesizing).await;
        let mut artifact = self.synthesizer.synthesize(&script, &selection, params.language).await?;

        // 6. Calibrate against the measured speech rate
        if outcome.path != ReconcilePath::NoNews && settings.audio_passes > 1 {
            progress.report(GenerationStep::Calibrating).await;
            self.calibrate(
                &reconciler,
                &brief,
                params,
                &settings,
                &selection,
                &mut script,
                &mut artifact,
                &mut stats,
            )
            .await;
        }

        // 7. Store
        progress.report(GenerationStep::Storing).await;
        let filename = self.store.save(&artifact.wav).await?;

        // 8. Assemble the response
        let language_detected = detect_language(&self.language_detector, &script.body);
        let warnings = collect_warnings(params, &selection, &report, &stats, language_detected);

        let requested_seconds = params.minutes * 60.0;
        let response = BulletinResponse {
            id: Uuid::new_v4(),
            script: script.full_text(),
            word_count: script.word_count(),
            target_words: stats.target_words,
            body_target_words: stats.body_target_words,
            attempts: stats.attempts,
            retries: stats.retries,
            fallback_applied: stats.fallback_applied,
            no_news: stats.no_news,
            sources: report.items.iter().map(SourceCitation::from).collect(),
            audio: AudioInfo {
                download_url: format!("/download/{}", filename),
                filename,
                duration_seconds: round2(artifact.duration_seconds),
                provider: artifact.provider,
            },
            duration_requested_minutes: params.minutes,
            duration_actual_minutes: round2(artifact.duration_seconds / 60.0),
            timing_accuracy: timing_accuracy(requested_seconds, artifact.duration_seconds),
            news_quality: report.quality(),
            language_detected,
            preset: params.preset,
            cached: false,
            warnings,
            generation_time_ms: started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            id = %response.id,
            words = response.word_count,
            target_words = response.target_words,
            attempts = response.attempts,
            retries = response.retries,
            fallback_applied = response.fallback_applied,
            no_news = response.no_news,
            audio_seconds = response.audio.duration_seconds,
            timing_accuracy = response.timing_accuracy,
            latency_ms = response.generation_time_ms,
            "Bulletin generated"
        );

        // 9. Cache the result if caching is enabled
        if let Some(cache) = &self.cache {
            cache.insert(cache_key, response.clone()).await;
        }

        Ok(response)
    }

    async fn record_outcome(
        &self,
        params: &BulletinParams,
        result: &Result<BulletinResponse, BulletinServiceError>,
        started: Instant,
    ) {
        let base = GenerationRecord {
            timestamp: Utc::now(),
            topics: params.topics.clone(),
            minutes: params.minutes,
            preset: params.preset,
            latency_ms: started.elapsed().as_millis() as u64,
            success: false,
            cached: false,
            timing_accuracy: None,
            retries: 0,
            fallback_applied: false,
            dependency: None,
            error: None,
        };

        let record = match result {
            Ok(response) => GenerationRecord {
                success: true,
                cached: response.cached,
                timing_accuracy: Some(response.timing_accuracy),
                retries: response.retries,
                fallback_applied: response.fallback_applied,
                ..base
            },
            Err(e) => GenerationRecord {
                dependency: match e {
                    BulletinServiceError::Dependency { dependency, .. } => Some(dependency.to_string()),
                    _ => None,
                },
                error: Some(e.to_string()),
                ..base
            },
        };
        self.metrics.record(record).await;
    }
}

/// Counters accumulated over the initial reconcile and any calibration pass
#[derive(Debug, Clone, Copy)]
struct ReconcileStats {
    /// Whole-script target, intro and outro included
    target_words: usize,
    body_target_words: usize,
    attempts: u32,
    retries: u32,
    fallback_applied: bool,
    no_news: bool,
}

impl ReconcileStats {
    fn new(outcome: &ReconcileOutcome, total_target: usize) -> Self {
        Self {
            target_words: total_target,
            body_target_words: outcome.target_words,
            attempts: outcome.attempts,
            retries: outcome.retries,
            fallback_applied: outcome.fallback_applied(),
            no_news: outcome.path == ReconcilePath::NoNews,
        }
    }
}

impl BulletinService {
    async fn cached(&self, key: &str) -> Option<BulletinResponse> {
        let cache = self.cache.as_ref()?;
        let cached = cache.get(key).await?;
        // A cached entry is only useful while its audio is still on disk
        if self.store.exists(&cached.audio.filename).await {
            Some(cached)
        } else {
            tracing::warn!(filename = %cached.audio.filename, "Cached bulletin audio missing, regenerating");
            None
        }
    }

    /// Re-target the script from the rate actually measured on the audio and
    /// synthesize again, keeping whichever take lands closer to the request.
    /// Bounded by the preset's audio passes; failures keep the current take.
    #[allow(clippy::too_many_arguments)]
    async fn calibrate(
        &self,
        reconciler: &LengthReconciler,
        brief: &ScriptBrief<'_>,
        params: &BulletinParams,
        settings: &PresetSettings,
        selection: &VoiceSelection,
        script: &mut NarrationScript,
        artifact: &mut AudioArtifact,
        stats: &mut ReconcileStats,
    ) {
        let requested_seconds = params.minutes * 60.0;

        for pass in 2..=settings.audio_passes {
            let deviation = (artifact.duration_seconds - requested_seconds).abs() / requested_seconds;
            if deviation <= settings.tolerance {
                break;
            }

            let Some(measured) = measured_timing(script, artifact) else {
                break;
            };
            let total_target = target_words(params.minutes, measured);
            let new_body_target = body_target(total_target, &script.intro, &script.outro);

            tracing::info!(
                pass,
                audio_seconds = artifact.duration_seconds,
                requested_seconds,
                measured_wpm = measured.wpm(),
                body_target = new_body_target,
                "Audio outside tolerance, calibrating"
            );

            let outcome = reconciler
                .reconcile_from(brief, new_body_target, script.body.clone())
                .await;
            stats.attempts += outcome.attempts;
            stats.retries += outcome.retries;

            let candidate = NarrationScript {
                intro: script.intro.clone(),
                body: outcome.draft.text.clone(),
                outro: script.outro.clone(),
            };
            match self.synthesizer.synthesize(&candidate, selection, params.language).await {
                Ok(retake) => {
                    let old_gap = (artifact.duration_seconds - requested_seconds).abs();
                    let new_gap = (retake.duration_seconds - requested_seconds).abs();
                    if new_gap < old_gap {
                        *script = candidate;
                        *artifact = retake;
                        stats.target_words = total_target;
                        stats.body_target_words = outcome.target_words;
                        stats.fallback_applied = outcome.fallback_applied();
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Calibration pass synthesis failed, keeping first take");
                    break;
                }
            }
        }
    }
}

/// Words left for the body once intro and outro are spoken
fn body_target(total_target: usize, intro: &str, outro: &str) -> usize {
    total_target
        .saturating_sub(count_words(intro) + count_words(outro))
        .max(MIN_TARGET_WORDS)
}

/// Speech rate of the stored take, excluding the fixed silences
fn measured_timing(script: &NarrationScript, artifact: &AudioArtifact) -> Option<TimingProfile> {
    let pcm = match PcmAudio::from_wav_bytes(&artifact.wav) {
        Ok(pcm) => pcm,
        Err(e) => {
            tracing::warn!(error = %e, "Could not decode the take for calibration");
            return None;
        }
    };
    let speech_seconds = pcm.duration_seconds() - (INTRO_GAP + OUTRO_GAP).as_secs_f64();
    if speech_seconds <= 0.0 {
        return None;
    }
    TimingProfile::from_measurement(script.word_count() as f64 * 60.0 / speech_seconds)
}

fn collect_warnings(
    params: &BulletinParams,
    selection: &VoiceSelection,
    report: &CollectionReport,
    stats: &ReconcileStats,
    language_detected: Option<LanguageCode>,
) -> Vec<String> {
    let mut warnings = Vec::new();
    if let Some(warning) = &selection.warning {
        warnings.push(warning.clone());
    }
    warnings.extend(report.warnings());
    if stats.no_news {
        warnings.push("no recent news found for the requested topics".to_string());
    }
    if stats.fallback_applied {
        warnings.push("script length was adjusted by the deterministic fallback".to_string());
    }
    if let Some(detected) = language_detected {
        if detected != params.language {
            tracing::warn!(requested = %params.language, detected = %detected, "Script language mismatch");
            warnings.push(format!(
                "script language detected as {} but {} was requested",
                detected.name(),
                params.language.name()
            ));
        }
    }
    warnings
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
