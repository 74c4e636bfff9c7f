use serde_json::Error as SerdeJsonError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unsupported file format: {0}")]
    InvalidFormat(String),

    #[error("Image file not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Could not write index file {path}: {source}")]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walkdir error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("JSON error: {0}")]
    Json(#[from] SerdeJsonError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AppError {
    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::PersistenceFailure {
            path: path.into(),
            source,
        }
    }
}
