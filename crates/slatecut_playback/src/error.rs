use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decode slot error: {0}")]
    Slot(String),
}

pub type Result<T> = std::result::Result<T, PlaybackError>;
