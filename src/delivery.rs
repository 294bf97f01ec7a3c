//! Picks how resolved media is handed to the messaging side

use crate::extractor::MediaLocator;
use crate::utils::config::{Settings, DEFAULT_DOCUMENT_LIMIT_BYTES, DEFAULT_VIDEO_LIMIT_BYTES};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    TooLarge { size: u64, limit: u64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::TooLarge { size, limit } => {
                write!(f, "file is {} bytes, limit is {} bytes", size, limit)
            }
        }
    }
}

/// The decision owns the locator, so a local file lives exactly as long as
/// the decision (or whatever the delivery step moves it into).
#[derive(Debug, PartialEq)]
pub enum DeliveryDecision {
    SendAsVideo(MediaLocator),
    SendAsDocument(MediaLocator),
    Reject(RejectReason),
}

#[derive(Debug, Clone, Copy)]
pub struct DeliverySelector {
    /// Largest file sent as streamable video
    pub video_limit_bytes: u64,
    /// Largest file sent at all
    pub document_limit_bytes: u64,
}

impl Default for DeliverySelector {
    fn default() -> Self {
        Self {
            video_limit_bytes: DEFAULT_VIDEO_LIMIT_BYTES,
            document_limit_bytes: DEFAULT_DOCUMENT_LIMIT_BYTES,
        }
    }
}

impl DeliverySelector {
    pub fn new(video_limit_bytes: u64) -> Self {
        Self {
            video_limit_bytes,
            ..Self::default()
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            video_limit_bytes: settings.video_limit_bytes,
            document_limit_bytes: settings.document_limit_bytes,
        }
    }

    /// Remote links always go out as video; local files by measured size.
    pub fn decide(&self, locator: MediaLocator) -> DeliveryDecision {
        let size = match locator.local() {
            None => return DeliveryDecision::SendAsVideo(locator),
            Some(media) => media.size(),
        };

        if size <= self.video_limit_bytes {
            DeliveryDecision::SendAsVideo(locator)
        } else if size <= self.document_limit_bytes {
            DeliveryDecision::SendAsDocument(locator)
        } else {
            DeliveryDecision::Reject(RejectReason::TooLarge {
                size,
                limit: self.document_limit_bytes,
            })
        }
    }
}
