//! Boundary with the messaging transport
//!
//! The transport (webhook, long polling, console) implements [`Messenger`];
//! [`MessageHandler`] turns one inbound text into replies through it.

use crate::delivery::{DeliveryDecision, DeliverySelector, RejectReason};
use crate::extractor::{classify, MediaLocator, Platform};
use crate::resolver::{MediaResolver, ResolveResult};
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use tracing::{error, info};

/// Text replies the handler can ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Welcome,
    Unsupported,
    Started,
    Failed(Platform),
    TooLarge(RejectReason),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Welcome => f.write_str(
                "Hi! Send me a link to a public YouTube, Instagram (post or reel) or TikTok video and I'll fetch it for you.",
            ),
            Notice::Unsupported => {
                f.write_str("Unsupported link. I can handle YouTube, Instagram and TikTok.")
            }
            Notice::Started => f.write_str("Downloading... please wait."),
            Notice::Failed(Platform::TikTok) => {
                f.write_str("Couldn't fetch this TikTok video. Try another link.")
            }
            Notice::Failed(Platform::Instagram) => f.write_str(
                "Instagram is temporarily unavailable due to platform restrictions. Try TikTok or YouTube!",
            ),
            Notice::Failed(_) => f.write_str("Couldn't download the video."),
            Notice::TooLarge(reason) => write!(f, "The video is too large to send ({}).", reason),
        }
    }
}

/// Outbound side of the messaging transport.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_notice(&self, notice: Notice) -> Result<()>;

    /// Streamable video: a direct URL or a local file
    async fn send_video(&self, media: &MediaLocator) -> Result<()>;

    /// Generic file transfer for media too big to stream
    async fn send_document(&self, media: &MediaLocator) -> Result<()>;
}

/// How an inbound message was dealt with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Ignored,
    Welcomed,
    Unsupported,
    Failed,
    SentVideo,
    SentDocument,
    Rejected,
}

pub struct MessageHandler {
    resolver: MediaResolver,
    selector: DeliverySelector,
}

impl MessageHandler {
    pub fn new(resolver: MediaResolver, selector: DeliverySelector) -> Self {
        Self { resolver, selector }
    }

    /// Handle one inbound text message.
    ///
    /// Any local file is removed once the messenger has returned, whether or
    /// not sending succeeded.
    pub async fn handle(&self, text: &str, messenger: &dyn Messenger) -> Result<Handled> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Handled::Ignored);
        }
        if let Some(command) = text.strip_prefix('/') {
            let name = command.split_whitespace().next().unwrap_or_default();
            // group chats address commands as /start@BotName
            if name.split('@').next() == Some("start") {
                messenger.send_notice(Notice::Welcome).await?;
                return Ok(Handled::Welcomed);
            }
            return Ok(Handled::Ignored);
        }

        if !classify(text).is_supported() {
            messenger.send_notice(Notice::Unsupported).await?;
            return Ok(Handled::Unsupported);
        }

        messenger.send_notice(Notice::Started).await?;

        let locator = match self.resolver.resolve(text).await {
            ResolveResult::Ready(locator) => locator,
            ResolveResult::Failed(platform) => {
                error!("Resolution failed for {} link {}", platform, text);
                messenger.send_notice(Notice::Failed(platform)).await?;
                return Ok(Handled::Failed);
            }
            ResolveResult::Unsupported => {
                messenger.send_notice(Notice::Unsupported).await?;
                return Ok(Handled::Unsupported);
            }
        };

        match self.selector.decide(locator) {
            DeliveryDecision::SendAsVideo(media) => {
                messenger.send_video(&media).await?;
                info!("Delivered video for {}", text);
                Ok(Handled::SentVideo)
            }
            DeliveryDecision::SendAsDocument(media) => {
                messenger.send_document(&media).await?;
                info!("Delivered document for {}", text);
                Ok(Handled::SentDocument)
            }
            DeliveryDecision::Reject(reason) => {
                messenger.send_notice(Notice::TooLarge(reason)).await?;
                Ok(Handled::Rejected)
            }
        }
    }
}
