use crate::extractor::models::BackendOutcome;
use async_trait::async_trait;
use std::time::Duration;

/// Core trait for all resolution backends
///
/// One implementation per third-party service. An adapter never returns an
/// error: every transport, decoding or scraping failure is folded into a
/// [`BackendOutcome`] so the chain can decide what to do next.
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    /// Returns a unique identifier for this backend (e.g., "cobalt", "ssstik")
    fn id(&self) -> &'static str;

    /// Budget this backend wants instead of the chain's default, if any
    fn timeout_hint(&self) -> Option<Duration> {
        None
    }

    /// Make one attempt at turning `url` into playable media within `timeout`
    async fn resolve(&self, url: &str, timeout: Duration) -> BackendOutcome;
}
