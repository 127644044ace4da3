use std::io::Cursor;
use std::time::Duration;

use super::timing::TtsProvider;

/// Silence after the intro segment
pub const INTRO_GAP: Duration = Duration::from_millis(600);
/// Silence before the outro segment
pub const OUTRO_GAP: Duration = Duration::from_millis(800);

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("sample rate mismatch: {expected} Hz vs {found} Hz")]
    SampleRateMismatch { expected: u32, found: u32 },
    #[error("unsupported audio format: {0}")]
    Unsupported(String),
    #[error("no audio segments to assemble")]
    Empty,
    #[error("wav encoding failed: {0}")]
    Wav(#[from] hound::Error),
}

/// Decoded mono 16-bit PCM, the common currency between speech providers
#[derive(Debug, Clone, PartialEq)]
pub struct PcmAudio {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl PcmAudio {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Decode raw little-endian 16-bit mono PCM as returned by the providers.
    /// A dangling odd byte is dropped.
    pub fn from_le_bytes(bytes: &[u8], sample_rate: u32) -> Self {
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self::new(samples, sample_rate)
    }

    pub fn silence(duration: Duration, sample_rate: u32) -> Self {
        let count = (duration.as_secs_f64() * sample_rate as f64).round() as usize;
        Self::new(vec![0; count], sample_rate)
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Append another chunk of the same stream
    pub fn extend(&mut self, other: PcmAudio) -> Result<(), AudioError> {
        if self.samples.is_empty() && self.sample_rate == 0 {
            self.sample_rate = other.sample_rate;
        }
        if other.sample_rate != self.sample_rate {
            return Err(AudioError::SampleRateMismatch {
                expected: self.sample_rate,
                found: other.sample_rate,
            });
        }
        self.samples.extend(other.samples);
        Ok(())
    }

    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, AudioError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::with_capacity(44 + self.samples.len() * 2));
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for sample in &self.samples {
                writer.write_sample(*sample)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }

    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, AudioError> {
        let reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        if spec.channels != 1 || spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
            return Err(AudioError::Unsupported(format!(
                "{} channel(s), {} bit {:?}",
                spec.channels, spec.bits_per_sample, spec.sample_format
            )));
        }
        let samples = reader.into_samples::<i16>().collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(samples, spec.sample_rate))
    }
}

/// Join intro, body and outro with the fixed silence paddings
pub fn assemble_segments(intro: PcmAudio, body: PcmAudio, outro: PcmAudio) -> Result<PcmAudio, AudioError> {
    let sample_rate = body.sample_rate;
    if sample_rate == 0 {
        return Err(AudioError::Empty);
    }

    let mut out = PcmAudio::new(Vec::new(), sample_rate);
    out.extend(intro)?;
    out.extend(PcmAudio::silence(INTRO_GAP, sample_rate))?;
    out.extend(body)?;
    out.extend(PcmAudio::silence(OUTRO_GAP, sample_rate))?;
    out.extend(outro)?;
    Ok(out)
}

/// Final synthesized bulletin audio. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub wav: Vec<u8>,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub provider: TtsProvider,
}

impl AudioArtifact {
    pub fn from_pcm(pcm: &PcmAudio, provider: TtsProvider) -> Result<Self, AudioError> {
        Ok(Self {
            wav: pcm.to_wav_bytes()?,
            duration_seconds: pcm.duration_seconds(),
            sample_rate: pcm.sample_rate,
            provider,
        })
    }
}
