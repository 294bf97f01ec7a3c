use crate::extractor::models::{BackendOutcome, MediaLocator};
use crate::extractor::platform::Platform;
use crate::extractor::services::{
    cobalt::CobaltAdapter, handshake::TokenHandshakeAdapter, igram::IgramAdapter,
    saveig::SaveigAdapter, tikwm::TikwmAdapter,
};
use crate::extractor::traits::BackendAdapter;
use crate::extractor::ytdlp::YtDlpAdapter;
use crate::utils::config::Settings;
use crate::utils::error::GrabError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-platform ordered backends
///
/// Adapters are tried strictly in order; the first success wins and the
/// rest are never called.
pub struct FallbackChain {
    youtube: Vec<Arc<dyn BackendAdapter>>,
    instagram: Vec<Arc<dyn BackendAdapter>>,
    tiktok: Vec<Arc<dyn BackendAdapter>>,
    attempt_timeout: Duration,
}

impl FallbackChain {
    pub fn new(
        youtube: Vec<Arc<dyn BackendAdapter>>,
        instagram: Vec<Arc<dyn BackendAdapter>>,
        tiktok: Vec<Arc<dyn BackendAdapter>>,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            youtube,
            instagram,
            tiktok,
            attempt_timeout,
        }
    }

    /// The production chains: yt-dlp for YouTube, Cobalt for Instagram,
    /// ssstik then snaptik then tikwm for TikTok.
    pub fn standard(settings: &Settings) -> Result<Self, GrabError> {
        let ytdlp = YtDlpAdapter::new(
            settings.work_dir.clone(),
            settings.ytdlp_format.clone(),
            settings.download_timeout,
        )?;
        Ok(Self::with_youtube(Arc::new(ytdlp), settings))
    }

    /// Production Instagram and TikTok chains around a given YouTube backend
    pub fn with_youtube(youtube: Arc<dyn BackendAdapter>, settings: &Settings) -> Self {
        Self::new(
            vec![youtube],
            instagram_chain(settings),
            tiktok_chain(),
            settings.attempt_timeout,
        )
    }

    /// Backends for a platform, in priority order
    pub fn adapters(&self, platform: Platform) -> &[Arc<dyn BackendAdapter>] {
        match platform {
            Platform::YouTube => &self.youtube,
            Platform::Instagram => &self.instagram,
            Platform::TikTok => &self.tiktok,
            Platform::Unsupported => &[],
        }
    }

    /// Try each backend for `platform` until one yields media
    pub async fn resolve(&self, platform: Platform, url: &str) -> Option<MediaLocator> {
        let adapters = self.adapters(platform);
        if adapters.is_empty() {
            debug!("No backends registered for {}", platform);
            return None;
        }

        for adapter in adapters {
            let budget = adapter.timeout_hint().unwrap_or(self.attempt_timeout);
            debug!("Trying backend {} (budget {:?})", adapter.id(), budget);

            let outcome = match tokio::time::timeout(budget, adapter.resolve(url, budget)).await
            {
                Ok(outcome) => outcome,
                Err(_) => BackendOutcome::TransportError(format!("timed out after {:?}", budget)),
            };

            match outcome {
                BackendOutcome::Success(locator) => {
                    info!("backend={} outcome=success platform={}", adapter.id(), platform);
                    return Some(locator);
                }
                BackendOutcome::NotFound(ref reason)
                | BackendOutcome::TransportError(ref reason)
                | BackendOutcome::ParseError(ref reason)
                | BackendOutcome::LocalResourceError(ref reason) => {
                    warn!(
                        "backend={} outcome={} platform={} reason={}",
                        adapter.id(),
                        outcome.kind(),
                        platform,
                        reason
                    );
                }
            }
        }

        warn!(
            "All {} backends exhausted for {} url={}",
            adapters.len(),
            platform,
            url
        );
        None
    }
}

fn instagram_chain(settings: &Settings) -> Vec<Arc<dyn BackendAdapter>> {
    let mut chain: Vec<Arc<dyn BackendAdapter>> = vec![Arc::new(CobaltAdapter::new())];
    if settings.instagram_fallbacks {
        chain.push(Arc::new(IgramAdapter::new()));
        chain.push(Arc::new(SaveigAdapter::new()));
    }
    chain
}

fn tiktok_chain() -> Vec<Arc<dyn BackendAdapter>> {
    vec![
        Arc::new(TokenHandshakeAdapter::ssstik()),
        Arc::new(TokenHandshakeAdapter::snaptik()),
        Arc::new(TikwmAdapter::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Stalls;

    #[async_trait]
    impl BackendAdapter for Stalls {
        fn id(&self) -> &'static str {
            "stalls"
        }

        async fn resolve(&self, _url: &str, _timeout: Duration) -> BackendOutcome {
            std::future::pending().await
        }
    }

    struct Answers;

    #[async_trait]
    impl BackendAdapter for Answers {
        fn id(&self) -> &'static str {
            "answers"
        }

        async fn resolve(&self, _url: &str, _timeout: Duration) -> BackendOutcome {
            MediaLocator::remote("https://cdn.example/ok.mp4").into()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_backend_is_cut_off_by_budget() {
        let chain = FallbackChain::new(
            vec![],
            vec![],
            vec![Arc::new(Stalls), Arc::new(Answers)],
            Duration::from_secs(15),
        );

        let locator = chain
            .resolve(Platform::TikTok, "https://www.tiktok.com/@a/video/1")
            .await
            .expect("second backend should answer");
        assert_eq!(locator.remote_url(), Some("https://cdn.example/ok.mp4"));
    }

    #[tokio::test]
    async fn test_unsupported_has_no_backends() {
        let chain = FallbackChain::new(
            vec![Arc::new(Answers)],
            vec![Arc::new(Answers)],
            vec![Arc::new(Answers)],
            Duration::from_secs(1),
        );
        assert!(chain.adapters(Platform::Unsupported).is_empty());
        assert!(chain.resolve(Platform::Unsupported, "x").await.is_none());
    }

    fn ids(chain: &FallbackChain, platform: Platform) -> Vec<&'static str> {
        chain.adapters(platform).iter().map(|a| a.id()).collect()
    }

    fn ytdlp(settings: &Settings) -> Arc<dyn BackendAdapter> {
        Arc::new(YtDlpAdapter::with_program(
            "yt-dlp".into(),
            vec![],
            settings.work_dir.clone(),
            settings.ytdlp_format.clone(),
            settings.download_timeout,
        ))
    }

    #[test]
    fn test_standard_chain_order() {
        let settings = Settings::with_token("t");
        let chain = FallbackChain::with_youtube(ytdlp(&settings), &settings);

        assert_eq!(ids(&chain, Platform::YouTube), vec!["yt-dlp"]);
        assert_eq!(ids(&chain, Platform::Instagram), vec!["cobalt"]);
        assert_eq!(ids(&chain, Platform::TikTok), vec!["ssstik", "snaptik", "tikwm"]);
    }

    #[test]
    fn test_instagram_fallbacks_follow_cobalt() {
        let settings = Settings {
            instagram_fallbacks: true,
            ..Settings::with_token("t")
        };
        let chain = FallbackChain::with_youtube(ytdlp(&settings), &settings);

        assert_eq!(ids(&chain, Platform::Instagram), vec!["cobalt", "igram", "saveig"]);
        assert_eq!(ids(&chain, Platform::TikTok), vec!["ssstik", "snaptik", "tikwm"]);
    }
}
