use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReflexError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("failed to initialise logging: {0}")]
    Logging(String),

    #[error("stdin must be a tty")]
    NotATty,
}

pub type Result<T> = std::result::Result<T, ReflexError>;
