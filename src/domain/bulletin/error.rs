use crate::domain::voice::SynthesisError;
use crate::error::AppError;
use crate::infrastructure::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum BulletinServiceError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("audio not found: {0}")]
    NotFound(String),
    #[error("{dependency} failed: {message}")]
    Dependency {
        dependency: &'static str,
        message: String,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<SynthesisError> for BulletinServiceError {
    fn from(err: SynthesisError) -> Self {
        BulletinServiceError::Dependency {
            dependency: "tts",
            message: err.to_string(),
        }
    }
}

impl From<StorageError> for BulletinServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidName => BulletinServiceError::Invalid("invalid audio filename".to_string()),
            StorageError::NotFound(name) => BulletinServiceError::NotFound(name),
            StorageError::Io(e) => BulletinServiceError::Other(anyhow::Error::new(e).context("audio storage")),
        }
    }
}

impl From<BulletinServiceError> for AppError {
    fn from(err: BulletinServiceError) -> Self {
        match err {
            BulletinServiceError::Invalid(msg) => AppError::BadRequest(msg),
            BulletinServiceError::NotFound(name) => AppError::NotFound(format!("Audio file {} not found", name)),
            BulletinServiceError::Dependency { dependency, message } => AppError::Dependency {
                dependency: dependency.to_string(),
                message,
            },
            BulletinServiceError::Other(e) => AppError::Internal(format!("{:#}", e)),
        }
    }
}
