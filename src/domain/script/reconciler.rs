use serde::Serialize;
use std::sync::Arc;

use super::prompt::{clean_completion, draft_request, revision_request};
use super::template;
use super::words::{count_words, truncate_words};
use crate::domain::sources::SourceItem;
use crate::domain::voice::{LanguageCode, TimingProfile};
use crate::infrastructure::repositories::{CompletionRequest, LanguageModelRepository};

/// Scripts shorter than this are not worth narrating
pub const MIN_TARGET_WORDS: usize = 60;
/// Applied to the tolerance on every retry so that late attempts converge
pub const TOLERANCE_WIDENING: f64 = 1.02;

pub fn target_words(minutes: f64, timing: TimingProfile) -> usize {
    ((minutes * timing.wpm()).round().max(0.0) as usize).max(MIN_TARGET_WORDS)
}

/// Acceptable word counts around a target
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToleranceBand {
    pub target: usize,
    pub tolerance: f64,
    pub lower: usize,
    pub upper: usize,
}

impl ToleranceBand {
    pub fn new(target: usize, tolerance: f64) -> Self {
        let t = target as f64;
        let lower = (t * (1.0 - tolerance)).ceil().max(1.0) as usize;
        let upper = ((t * (1.0 + tolerance)).floor() as usize).max(lower);
        Self {
            target,
            tolerance,
            lower,
            upper,
        }
    }

    pub fn contains(&self, words: usize) -> bool {
        (self.lower..=self.upper).contains(&words)
    }

    pub fn widened(&self) -> Self {
        Self::new(self.target, self.tolerance * TOLERANCE_WIDENING)
    }

    pub fn distance(&self, words: usize) -> usize {
        words.abs_diff(self.target)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReconcilerSettings {
    /// Model calls allowed per reconcile, drafts and revisions together
    pub max_attempts: u32,
    pub tolerance: f64,
}

/// Everything the composer needs to write about
#[derive(Debug, Clone, Copy)]
pub struct ScriptBrief<'a> {
    pub topics: &'a [String],
    pub items: &'a [SourceItem],
    pub language: LanguageCode,
    pub tone: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftScript {
    pub text: String,
    pub word_count: usize,
}

impl DraftScript {
    pub fn new(text: String) -> Self {
        let word_count = count_words(&text);
        Self { text, word_count }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilePath {
    Accepted,
    FallbackApplied,
    NoNews,
}

#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub draft: DraftScript,
    pub target_words: usize,
    /// Band in force when the loop ended (after any widening)
    pub band: ToleranceBand,
    /// Model calls made
    pub attempts: u32,
    /// Expand/condense calls among them
    pub retries: u32,
    pub model_failures: u32,
    pub path: ReconcilePath,
}

impl ReconcileOutcome {
    pub fn fallback_applied(&self) -> bool {
        self.path == ReconcilePath::FallbackApplied
    }
}

enum State {
    Drafting,
    Measuring(String),
    Retrying(DraftScript),
    Accepted(DraftScript),
    FallbackApplied,
}

struct Progress {
    band: ToleranceBand,
    attempts: u32,
    retries: u32,
    model_failures: u32,
    best: Option<DraftScript>,
}

/// Drives a language model toward a script of a given length.
///
/// Drafting -> Measuring -> Accepted, or Measuring -> Retrying -> Measuring
/// while attempts remain, ending in FallbackApplied. Every transition out of
/// Drafting or Retrying spends one attempt, so the loop is bounded by
/// `max_attempts` model calls. Model errors never escape.
pub struct LengthReconciler {
    llm: Arc<dyn LanguageModelRepository>,
    settings: ReconcilerSettings,
}

impl LengthReconciler {
    pub fn new(llm: Arc<dyn LanguageModelRepository>, settings: ReconcilerSettings) -> Self {
        Self { llm, settings }
    }

    pub fn settings(&self) -> ReconcilerSettings {
        self.settings
    }

    pub async fn reconcile(&self, brief: &ScriptBrief<'_>, target_words: usize) -> ReconcileOutcome {
        if brief.items.is_empty() {
            tracing::info!(topics = ?brief.topics, "No source items, using templated no-news script");
            return ReconcileOutcome {
                draft: DraftScript::new(template::no_news_body(brief.language, brief.topics)),
                target_words,
                band: ToleranceBand::new(target_words, self.settings.tolerance),
                attempts: 0,
                retries: 0,
                model_failures: 0,
                path: ReconcilePath::NoNews,
            };
        }

        self.run(brief, target_words, State::Drafting).await
    }

    /// Reconcile an existing script against a new target, starting at Measuring
    pub async fn reconcile_from(
        &self,
        brief: &ScriptBrief<'_>,
        target_words: usize,
        text: String,
    ) -> ReconcileOutcome {
        self.run(brief, target_words, State::Measuring(text)).await
    }

    async fn run(&self, brief: &ScriptBrief<'_>, target_words: usize, initial: State) -> ReconcileOutcome {
        let max_attempts = self.settings.max_attempts;
        let mut progress = Progress {
            band: ToleranceBand::new(target_words, self.settings.tolerance),
            attempts: 0,
            retries: 0,
            model_failures: 0,
            best: None,
        };
        let mut state = initial;

        loop {
            state = match state {
                State::Drafting => {
                    if progress.attempts >= max_attempts {
                        State::FallbackApplied
                    } else {
                        progress.attempts += 1;
                        let request = draft_request(brief, target_words);
                        match self.complete(request, progress.attempts).await {
                            Some(text) => State::Measuring(text),
                            None => {
                                progress.model_failures += 1;
                                State::Drafting
                            }
                        }
                    }
                }
                State::Measuring(text) => {
                    let draft = DraftScript::new(text);
                    let band = progress.band;
                    tracing::debug!(
                        attempt = progress.attempts,
                        words = draft.word_count,
                        target = target_words,
                        lower = band.lower,
                        upper = band.upper,
                        "Measured draft"
                    );

                    let closer = progress
                        .best
                        .as_ref()
                        .map_or(true, |best| band.distance(draft.word_count) < band.distance(best.word_count));
                    if closer {
                        progress.best = Some(draft.clone());
                    }

                    if band.contains(draft.word_count) {
                        State::Accepted(draft)
                    } else if progress.attempts < max_attempts {
                        progress.band = band.widened();
                        State::Retrying(draft)
                    } else {
                        State::FallbackApplied
                    }
                }
                State::Retrying(draft) => {
                    progress.attempts += 1;
                    progress.retries += 1;
                    let request = revision_request(brief, &draft.text, draft.word_count, target_words);
                    match self.complete(request, progress.attempts).await {
                        Some(text) => State::Measuring(text),
                        None => {
                            progress.model_failures += 1;
                            if progress.attempts < max_attempts {
                                State::Retrying(draft)
                            } else {
                                State::FallbackApplied
                            }
                        }
                    }
                }
                State::Accepted(draft) => {
                    tracing::info!(
                        words = draft.word_count,
                        target = target_words,
                        attempts = progress.attempts,
                        retries = progress.retries,
                        "Script accepted"
                    );
                    return Self::finish(draft, target_words, progress, ReconcilePath::Accepted);
                }
                State::FallbackApplied => {
                    let draft = Self::apply_fallback(brief, progress.best.take(), progress.band);
                    tracing::warn!(
                        words = draft.word_count,
                        target = target_words,
                        attempts = progress.attempts,
                        model_failures = progress.model_failures,
                        "Retry budget exhausted, applied deterministic length fallback"
                    );
                    return Self::finish(draft, target_words, progress, ReconcilePath::FallbackApplied);
                }
            };
        }
    }

    fn finish(draft: DraftScript, target_words: usize, progress: Progress, path: ReconcilePath) -> ReconcileOutcome {
        ReconcileOutcome {
            draft,
            target_words,
            band: progress.band,
            attempts: progress.attempts,
            retries: progress.retries,
            model_failures: progress.model_failures,
            path,
        }
    }

    /// Truncate to the upper bound or pad with filler to the lower bound.
    /// Without any model output the headlines themselves seed the text.
    fn apply_fallback(brief: &ScriptBrief<'_>, best: Option<DraftScript>, band: ToleranceBand) -> DraftScript {
        let mut text = best
            .map(|d| d.text)
            .unwrap_or_else(|| template::headline_digest(brief.items));

        if count_words(&text) > band.upper {
            text = truncate_words(&text, band.upper);
        }

        let filler = template::filler_sentence(brief.language);
        while count_words(&text) < band.lower {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(filler);
        }

        if count_words(&text) > band.upper {
            text = truncate_words(&text, band.upper);
        }

        DraftScript::new(text)
    }

    async fn complete(&self, request: CompletionRequest, attempt: u32) -> Option<String> {
        match self.llm.complete(request).await {
            Ok(raw) => {
                let text = clean_completion(&raw);
                if text.is_empty() {
                    tracing::warn!(attempt, "Language model returned an empty completion");
                    None
                } else {
                    Some(text)
                }
            }
            Err(e) => {
                tracing::warn!(attempt, error = %e, "Language model call failed");
                None
            }
        }
    }
}
