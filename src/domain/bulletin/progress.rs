use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Pipeline stages reported while a bulletin is being generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStep {
    Queued,
    Validating,
    CollectingSources,
    WritingScript,
    Synthesizing,
    Calibrating,
    Storing,
    Completed,
}

impl GenerationStep {
    pub fn percent(&self) -> u8 {
        match self {
            GenerationStep::Queued => 0,
            GenerationStep::Validating => 5,
            GenerationStep::CollectingSources => 15,
            GenerationStep::WritingScript => 35,
            GenerationStep::Synthesizing => 60,
            GenerationStep::Calibrating => 75,
            GenerationStep::Storing => 90,
            GenerationStep::Completed => 100,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GenerationStep::Queued => "Waiting to start",
            GenerationStep::Validating => "Checking the request",
            GenerationStep::CollectingSources => "Collecting recent news",
            GenerationStep::WritingScript => "Writing the script",
            GenerationStep::Synthesizing => "Recording the narration",
            GenerationStep::Calibrating => "Calibrating the length",
            GenerationStep::Storing => "Saving the audio",
            GenerationStep::Completed => "Bulletin ready",
        }
    }
}

/// Receives pipeline stages as generation advances
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn report(&self, step: GenerationStep);
}

/// Sink for callers that wait on the whole pipeline
pub struct NoProgress;

#[async_trait]
impl ProgressSink for NoProgress {
    async fn report(&self, _step: GenerationStep) {}
}
