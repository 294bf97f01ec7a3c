//! Public entry point: URL in, playable media (or a reason why not) out

use crate::extractor::{FallbackChain, MediaLocator, Platform, ResolutionRequest};
use crate::utils::config::Settings;
use crate::utils::error::GrabError;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What the messaging side gets back for one URL.
#[derive(Debug, PartialEq)]
pub enum ResolveResult {
    /// No platform recognised; no backend was contacted.
    Unsupported,
    /// Every backend for the platform failed, or the request ran out of time.
    Failed(Platform),
    Ready(MediaLocator),
}

impl ResolveResult {
    pub fn is_ready(&self) -> bool {
        matches!(self, ResolveResult::Ready(_))
    }
}

/// Classifies a URL and runs the matching fallback chain.
///
/// Holds no per-request state, so one instance can serve any number of
/// concurrent requests.
pub struct MediaResolver {
    chain: FallbackChain,
    request_timeout: Option<Duration>,
}

impl MediaResolver {
    pub fn new(chain: FallbackChain) -> Self {
        Self {
            chain,
            request_timeout: None,
        }
    }

    /// Production chains with the configured outer budget.
    pub fn from_settings(settings: &Settings) -> Result<Self, GrabError> {
        Ok(Self::new(FallbackChain::standard(settings)?).with_request_timeout(settings.request_timeout))
    }

    pub fn with_request_timeout(mut self, budget: Duration) -> Self {
        self.request_timeout = Some(budget);
        self
    }

    /// Resolve under the configured request budget, if any.
    pub async fn resolve(&self, raw_url: &str) -> ResolveResult {
        match self.request_timeout {
            Some(budget) => self.resolve_within(raw_url, budget).await,
            None => self.run(&ResolutionRequest::new(raw_url)).await,
        }
    }

    /// Resolve, giving up after `budget`.
    pub async fn resolve_within(&self, raw_url: &str, budget: Duration) -> ResolveResult {
        let request = ResolutionRequest::new(raw_url);
        match tokio::time::timeout(budget, self.run(&request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Resolution of {} exceeded {:?}", request.url, budget);
                ResolveResult::Failed(request.platform)
            }
        }
    }

    /// Resolve until `cancel` fires. Cancelling drops the in-flight backend
    /// call, which closes its connection and discards any partial download.
    pub async fn resolve_until(&self, raw_url: &str, cancel: &CancellationToken) -> ResolveResult {
        let request = ResolutionRequest::new(raw_url);
        tokio::select! {
            result = self.run(&request) => result,
            _ = cancel.cancelled() => {
                info!("Resolution of {} cancelled", request.url);
                ResolveResult::Failed(request.platform)
            }
        }
    }

    async fn run(&self, request: &ResolutionRequest) -> ResolveResult {
        if !request.platform.is_supported() {
            debug!("Unsupported link: {}", request.url);
            return ResolveResult::Unsupported;
        }

        match self.chain.resolve(request.platform, &request.url).await {
            Some(locator) => ResolveResult::Ready(locator),
            None => ResolveResult::Failed(request.platform),
        }
    }
}
