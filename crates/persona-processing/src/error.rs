use thiserror::Error;

/// Image transformation errors
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Invalid transform options: {0}")]
    InvalidOptions(String),

    #[error("Failed to read staged file: {0}")]
    Io(#[from] std::io::Error),
}

pub type TransformResult<T> = Result<T, TransformError>;
