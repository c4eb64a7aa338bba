use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid URL: {0}")]
    InvalidEndpoint(String),

    #[error("Failed to process image: {0}")]
    ImageEncodingFailed(String),

    #[error("Invalid response format")]
    InvalidResponse,

    #[error("Failed to decode response: {0}")]
    DecodingFailed(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Please select an image first")]
    NoImageSelected,

    // Only ever returned to the caller of a cancelled run, never shown as state.
    #[error("Prediction was superseded by a newer request")]
    Superseded,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<image::ImageError> for PipelineError {
    fn from(err: image::ImageError) -> Self {
        PipelineError::ImageEncodingFailed(err.to_string())
    }
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        PipelineError::Config(err.to_string())
    }
}
