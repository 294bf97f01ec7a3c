//! Error handling for grabbot

use thiserror::Error;

/// Main error type for grabbot
#[derive(Debug, Error)]
pub enum GrabError {
    #[error("Bot token missing. Set BOT_TOKEN (or TELEGRAM_BOT_TOKEN)")]
    MissingToken,

    #[error("Invalid value for {key}: {value:?}")]
    InvalidSetting { key: &'static str, value: String },

    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    #[error("Local media unusable: {0}")]
    LocalResource(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Why a single backend attempt did not produce media.
///
/// Adapters write their protocol against `Result<_, BackendError>` and fold it
/// into a [`BackendOutcome`](crate::extractor::BackendOutcome) at the trait
/// boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The service answered but declined this URL.
    #[error("not found: {0}")]
    NotFound(String),

    /// Network failure or timeout.
    #[error("transport: {0}")]
    Transport(String),

    /// The response no longer has the shape we scrape for.
    #[error("unexpected response: {0}")]
    Parse(String),

    /// The download step claimed success but left nothing usable on disk.
    #[error("local resource: {0}")]
    LocalResource(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Parse(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

impl From<GrabError> for BackendError {
    fn from(err: GrabError) -> Self {
        BackendError::LocalResource(err.to_string())
    }
}
