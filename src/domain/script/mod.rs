pub mod prompt;
pub mod reconciler;
pub mod template;
pub mod words;

pub use reconciler::{
    target_words, DraftScript, LengthReconciler, ReconcileOutcome, ReconcilePath, ReconcilerSettings, ScriptBrief,
    ToleranceBand, MIN_TARGET_WORDS,
};
pub use template::DayPart;
pub use words::{count_words, truncate_words};

/// The three narrated segments of a bulletin
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationScript {
    pub intro: String,
    pub body: String,
    pub outro: String,
}

impl NarrationScript {
    pub fn full_text(&self) -> String {
        [self.intro.as_str(), self.body.as_str(), self.outro.as_str()]
            .iter()
            .filter(|s| !s.trim().is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn word_count(&self) -> usize {
        count_words(&self.intro) + count_words(&self.body) + count_words(&self.outro)
    }
}
