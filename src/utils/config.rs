//! Service configuration, read from the environment at startup

use crate::utils::error::GrabError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_VIDEO_LIMIT_BYTES: u64 = 50 * 1024 * 1024;
pub const DEFAULT_DOCUMENT_LIMIT_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Opaque messaging-transport token
    pub bot_token: String,

    /// Budget for one scraping-service attempt
    pub attempt_timeout: Duration,

    /// Budget for one yt-dlp download
    pub download_timeout: Duration,

    /// Budget for a whole resolution, all fallbacks included
    pub request_timeout: Duration,

    /// Files at or below this size are sent as video
    pub video_limit_bytes: u64,

    /// Files above this size are not delivered at all
    pub document_limit_bytes: u64,

    /// Parent directory for per-request download directories
    pub work_dir: PathBuf,

    /// Append igram and saveig after Cobalt for Instagram
    pub instagram_fallbacks: bool,

    /// yt-dlp `-f` selector
    pub ytdlp_format: String,
}

impl Settings {
    /// Defaults for everything except the token.
    pub fn with_token(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            attempt_timeout: Duration::from_secs(20),
            download_timeout: Duration::from_secs(300),
            request_timeout: Duration::from_secs(600),
            video_limit_bytes: DEFAULT_VIDEO_LIMIT_BYTES,
            document_limit_bytes: DEFAULT_DOCUMENT_LIMIT_BYTES,
            work_dir: std::env::temp_dir(),
            instagram_fallbacks: false,
            ytdlp_format: "best[height<=720]".to_string(),
        }
    }

    pub fn from_env() -> Result<Self, GrabError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. A missing or blank token is fatal.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GrabError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = ["BOT_TOKEN", "TELEGRAM_BOT_TOKEN"]
            .iter()
            .filter_map(|key| lookup(key))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .ok_or(GrabError::MissingToken)?;

        let mut settings = Self::with_token(token);

        if let Some(secs) = parse_var::<u64>(&lookup, "GRAB_ATTEMPT_TIMEOUT_SECS")? {
            settings.attempt_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "GRAB_DOWNLOAD_TIMEOUT_SECS")? {
            settings.download_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "GRAB_REQUEST_TIMEOUT_SECS")? {
            settings.request_timeout = Duration::from_secs(secs);
        }
        if let Some(bytes) = parse_var::<u64>(&lookup, "GRAB_VIDEO_LIMIT_BYTES")? {
            settings.video_limit_bytes = bytes;
        }
        if let Some(bytes) = parse_var::<u64>(&lookup, "GRAB_DOCUMENT_LIMIT_BYTES")? {
            settings.document_limit_bytes = bytes;
        }
        if let Some(dir) = lookup("GRAB_WORK_DIR").filter(|v| !v.trim().is_empty()) {
            settings.work_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("GRAB_INSTAGRAM_FALLBACKS") {
            settings.instagram_fallbacks = parse_flag("GRAB_INSTAGRAM_FALLBACKS", &raw)?;
        }
        if let Some(format) = lookup("GRAB_YTDLP_FORMAT").filter(|v| !v.trim().is_empty()) {
            settings.ytdlp_format = format;
        }

        Ok(settings)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, GrabError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| GrabError::InvalidSetting { key, value: raw }),
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, GrabError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(GrabError::InvalidSetting {
            key,
            value: raw.to_string(),
        }),
    }
}
