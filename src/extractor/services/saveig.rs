use crate::extractor::models::{BackendOutcome, MediaLocator};
use crate::extractor::services::igram::mobile_instagram_url;
use crate::extractor::services::{attempt_client, decode_link, expect_ok};
use crate::extractor::traits::BackendAdapter;
use crate::utils::error::BackendError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

pub const SAVEIG_BASE: &str = "https://saveig.org";

static MP4_HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r#"href="([^"]+\.mp4[^"]*)""#).unwrap());

#[derive(Debug, Deserialize)]
struct SaveigResponse {
    #[serde(default)]
    data: String,
}

/// saveig.org: tokenless search endpoint returning an HTML fragment in JSON.
pub struct SaveigAdapter {
    base_url: String,
}

impl Default for SaveigAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SaveigAdapter {
    pub fn new() -> Self {
        Self::with_base_url(SAVEIG_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn attempt(&self, url: &str, timeout: Duration) -> Result<MediaLocator, BackendError> {
        let client = attempt_client(true)?;
        let mobile = mobile_instagram_url(url);

        let response = client
            .post(format!("{}/api/ajaxSearch", self.base_url))
            .form(&[("q", mobile.as_str())])
            .timeout(timeout)
            .send()
            .await?;

        let body: SaveigResponse = expect_ok(response, "saveig")?.json().await?;
        let link = first_mp4_link(&body.data)?;
        MediaLocator::remote(&decode_link(link)?)
    }
}

fn first_mp4_link(html: &str) -> Result<&str, BackendError> {
    MP4_HREF
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| BackendError::Parse("saveig fragment has no mp4 link".to_string()))
}

#[async_trait]
impl BackendAdapter for SaveigAdapter {
    fn id(&self) -> &'static str {
        "saveig"
    }

    async fn resolve(&self, url: &str, timeout: Duration) -> BackendOutcome {
        self.attempt(url, timeout).await.into()
    }
}
