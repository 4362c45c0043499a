use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Please enter a valid YouTube URL.")]
    InvalidInput,

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}
