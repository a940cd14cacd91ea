use thiserror::Error;

/// Engine error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Frame unavailable: {0}")]
    FrameUnavailable(String),

    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl AppError {
    /// Whether the error only affects the current pass and the loop should keep going.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::FrameUnavailable(_) | AppError::Image(_) | AppError::Io(_)
        )
    }
}

impl From<std::collections::TryReserveError> for AppError {
    fn from(e: std::collections::TryReserveError) -> Self {
        AppError::ResourceExhausted(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
