use thiserror::Error;

/// Errors from the fallible surfaces around the trait engine
/// (JSON API, project files, configuration, localization).
#[derive(Error, Debug)]
pub enum CardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid project: {0}")]
    InvalidProject(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Localization error: {0}")]
    Localization(String),

    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),
}

impl CardError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            CardError::Io(_) => true,
            CardError::UnsupportedLocale(_) => true, // Can fall back to en-US
            CardError::Json(_) => false,
            CardError::InvalidProject(_) => false,
            CardError::InvalidConfig(_) => false,
            CardError::Localization(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CardError>;
