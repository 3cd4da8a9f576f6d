// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GhostHandError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed landmark frame: {0}")]
    MalformedFrame(String),

    #[error("replay line {line}: {reason}")]
    Replay { line: usize, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("session recorder has no output directory")]
    NoOutputDir,
}

pub type Result<T> = std::result::Result<T, GhostHandError>;
