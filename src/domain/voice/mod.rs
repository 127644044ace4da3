pub mod audio;
pub mod language;
pub mod synthesizer;
pub mod timing;

pub use audio::{assemble_segments, AudioArtifact, AudioError, PcmAudio, INTRO_GAP, OUTRO_GAP};
pub use language::{build_detector, detect_language, polly_voice_for_language, LanguageCode};
pub use synthesizer::{SynthesisError, VoiceSelection, VoiceSynthesizer};
pub use timing::{
    elevenlabs_voices, openai_voices, polly_voices, TimingProfile, TimingProfileError, TtsProvider, VoiceProfile,
    MAX_WPM, MIN_WPM,
};
