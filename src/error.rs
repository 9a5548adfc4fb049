use thiserror::Error;

/// Errors at the crate's I/O edges. The pipeline itself never fails; it
/// answers `None` for input it cannot use.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Voice session error: {0}")]
    Session(String),
}

pub type Result<T> = std::result::Result<T, Error>;
