use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use uuid::Uuid;

static AUDIO_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,128}\.wav$").expect("valid regex"));

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid audio filename")]
    InvalidName,
    #[error("audio file not found: {0}")]
    NotFound(String),
    #[error("audio storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Only plain `name.wav` filenames are served; anything that could escape
/// the data directory is rejected before touching the filesystem
pub fn validate_filename(name: &str) -> bool {
    AUDIO_FILENAME.is_match(name)
}

/// Flat directory of finished bulletin WAV files
pub struct AudioStore {
    dir: PathBuf,
}

impl AudioStore {
    /// Create the store, making the directory if needed
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist a WAV file and return its public filename. The bytes are
    /// written to a hidden temp file first and renamed into place, so a
    /// download never sees a partial file.
    pub async fn save(&self, wav: &[u8]) -> Result<String, StorageError> {
        let filename = format!("bulletin_{}.wav", Uuid::new_v4());
        let tmp = self.dir.join(format!(".{}.tmp", filename));
        let target = self.dir.join(&filename);

        tokio::fs::write(&tmp, wav).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::debug!(filename = %filename, bytes = wav.len(), "Audio file stored");
        Ok(filename)
    }

    pub async fn open(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        if !validate_filename(filename) {
            return Err(StorageError::InvalidName);
        }

        match tokio::fs::read(self.dir.join(filename)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound(filename.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn exists(&self, filename: &str) -> bool {
        validate_filename(filename) && tokio::fs::try_exists(self.dir.join(filename)).await.unwrap_or(false)
    }
}
