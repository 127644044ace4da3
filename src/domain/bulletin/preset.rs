use serde::{Deserialize, Serialize};

use crate::domain::script::ReconcilerSettings;
use crate::domain::sources::CollectionPlan;

/// Named trade-off between speed and timing precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Fast,
    Balanced,
    Precise,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetSettings {
    pub queries_per_topic: usize,
    pub items_per_query: usize,
    pub max_prompt_items: usize,
    pub snippet_chars: usize,
    pub max_attempts: u32,
    pub tolerance: f64,
    /// Synthesis passes; more than one enables audio calibration
    pub audio_passes: u32,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Fast => "fast",
            Preset::Balanced => "balanced",
            Preset::Precise => "precise",
        }
    }

    pub fn settings(&self) -> PresetSettings {
        match self {
            Preset::Fast => PresetSettings {
                queries_per_topic: 1,
                items_per_query: 5,
                max_prompt_items: 8,
                snippet_chars: 300,
                max_attempts: 3,
                tolerance: 0.08,
                audio_passes: 1,
            },
            Preset::Balanced => PresetSettings {
                queries_per_topic: 2,
                items_per_query: 6,
                max_prompt_items: 12,
                snippet_chars: 500,
                max_attempts: 3,
                tolerance: 0.05,
                audio_passes: 1,
            },
            Preset::Precise => PresetSettings {
                queries_per_topic: 3,
                items_per_query: 6,
                max_prompt_items: 20,
                snippet_chars: 800,
                max_attempts: 4,
                tolerance: 0.05,
                audio_passes: 2,
            },
        }
    }
}

impl PresetSettings {
    pub fn collection_plan(&self) -> CollectionPlan {
        CollectionPlan {
            queries_per_topic: self.queries_per_topic,
            items_per_query: self.items_per_query,
            max_items: self.max_prompt_items,
            snippet_chars: self.snippet_chars,
        }
    }

    pub fn reconciler_settings(&self) -> ReconcilerSettings {
        ReconcilerSettings {
            max_attempts: self.max_attempts,
            tolerance: self.tolerance,
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fast" => Ok(Preset::Fast),
            "balanced" => Ok(Preset::Balanced),
            "precise" | "perfect" => Ok(Preset::Precise),
            other => Err(format!(
                "unknown preset '{}', expected one of fast, balanced, precise",
                other
            )),
        }
    }
}
