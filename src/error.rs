use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Model not found at {}. Download the detector weights and convert them to .rten, or pass --model", path.display())]
    ModelNotFound { path: PathBuf },

    #[error("Source directory not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Detection failed for {file}: {message}")]
    Detection { file: String, message: String },

    #[error("Failed to write {}: {source}", path.display())]
    DestinationWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image {}: {message}", path.display())]
    ImageDecode { path: PathBuf, message: String },

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AuditResult<T> = Result<T, AuditError>;
