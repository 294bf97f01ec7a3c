use crate::extractor::models::{BackendOutcome, MediaLocator};
use crate::extractor::services::{attempt_client, expect_ok};
use crate::extractor::traits::BackendAdapter;
use crate::utils::error::BackendError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const COBALT_ENDPOINT: &str = "https://cobalt.tools/api/json";

/// Statuses that come with a usable `url`.
const SUCCESS_MARKERS: &[&str] = &["success", "redirect", "tunnel", "stream"];

#[derive(Debug, Serialize)]
struct CobaltRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct CobaltResponse {
    status: Option<String>,
    url: Option<String>,
}

/// Cobalt: one JSON POST, answer carries the media URL.
pub struct CobaltAdapter {
    endpoint: String,
}

impl Default for CobaltAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl CobaltAdapter {
    pub fn new() -> Self {
        Self::with_endpoint(COBALT_ENDPOINT)
    }

    /// Point at another instance (self-hosted Cobalt, or a test server).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    async fn attempt(&self, url: &str, timeout: Duration) -> Result<MediaLocator, BackendError> {
        let client = attempt_client(false)?;
        let response = client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&CobaltRequest { url: url.trim() })
            .timeout(timeout)
            .send()
            .await?;

        let body: CobaltResponse = expect_ok(response, "cobalt")?.json().await?;
        interpret(body)
    }
}

fn interpret(body: CobaltResponse) -> Result<MediaLocator, BackendError> {
    let status = body.status.unwrap_or_default();
    if !SUCCESS_MARKERS.contains(&status.as_str()) {
        return Err(BackendError::NotFound(format!("cobalt status {:?}", status)));
    }

    match body.url.as_deref().map(str::trim) {
        Some(link) if !link.is_empty() => {
            debug!("cobalt resolved with status {}", status);
            MediaLocator::remote(link)
        }
        _ => Err(BackendError::NotFound(format!(
            "cobalt status {:?} without url",
            status
        ))),
    }
}

#[async_trait]
impl BackendAdapter for CobaltAdapter {
    fn id(&self) -> &'static str {
        "cobalt"
    }

    async fn resolve(&self, url: &str, timeout: Duration) -> BackendOutcome {
        self.attempt(url, timeout).await.into()
    }
}
