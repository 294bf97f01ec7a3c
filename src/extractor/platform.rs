//! URL to platform classification

use std::fmt;

/// Video platforms with a resolution chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    YouTube,
    Instagram,
    TikTok,
    Unsupported,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::YouTube => "youtube",
            Platform::Instagram => "instagram",
            Platform::TikTok => "tiktok",
            Platform::Unsupported => "unsupported",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Platform::Unsupported)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain fragments checked in order; first match wins.
const DOMAIN_FRAGMENTS: &[(&str, Platform)] = &[
    ("youtube.com", Platform::YouTube),
    ("youtu.be", Platform::YouTube),
    ("instagram.com", Platform::Instagram),
    ("tiktok.com", Platform::TikTok),
];

/// Classify a URL by substring match against known domain fragments.
pub fn classify(url: &str) -> Platform {
    DOMAIN_FRAGMENTS
        .iter()
        .find(|(fragment, _)| url.contains(fragment))
        .map(|(_, platform)| *platform)
        .unwrap_or(Platform::Unsupported)
}

/// A trimmed inbound URL plus its platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub url: String,
    pub platform: Platform,
}

impl ResolutionRequest {
    pub fn new(raw_url: &str) -> Self {
        let url = raw_url.trim().to_string();
        let platform = classify(&url);
        Self { url, platform }
    }
}
