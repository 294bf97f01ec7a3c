use crate::extractor::models::{BackendOutcome, MediaLocator};
use crate::extractor::services::{attempt_client, decode_link, expect_ok};
use crate::extractor::traits::BackendAdapter;
use crate::utils::error::BackendError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub const IGRAM_BASE: &str = "https://igram.io";

#[derive(Debug, Deserialize)]
struct IgramResponse {
    #[serde(default)]
    data: Vec<IgramItem>,
}

#[derive(Debug, Deserialize)]
struct IgramItem {
    url: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// igram.io: landing page for cookies, then a form POST answered with JSON.
pub struct IgramAdapter {
    base_url: String,
}

impl Default for IgramAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl IgramAdapter {
    pub fn new() -> Self {
        Self::with_base_url(IGRAM_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn attempt(&self, url: &str, timeout: Duration) -> Result<MediaLocator, BackendError> {
        let client = attempt_client(true)?;
        let referer = format!("{}/", self.base_url);

        let landing = client.get(&referer).timeout(timeout).send().await?;
        expect_ok(landing, "igram landing page")?;

        let mobile = mobile_instagram_url(url);
        let response = client
            .post(format!("{}/api/", self.base_url))
            .header(reqwest::header::REFERER, &referer)
            .form(&[("url", mobile.as_str())])
            .timeout(timeout)
            .send()
            .await?;

        let body: IgramResponse = expect_ok(response, "igram")?.json().await?;
        let item = body
            .data
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound("igram returned no media".to_string()))?;

        match (item.kind.as_deref(), item.url) {
            (Some("video") | Some("image"), Some(link)) => MediaLocator::remote(&decode_link(&link)?),
            (kind, _) => Err(BackendError::Parse(format!(
                "igram item of type {:?} has no usable url",
                kind
            ))),
        }
    }
}

/// The mobile host answers scrapers more reliably than www.
pub fn mobile_instagram_url(url: &str) -> String {
    url.trim().replace("www.instagram.com", "m.instagram.com")
}

#[async_trait]
impl BackendAdapter for IgramAdapter {
    fn id(&self) -> &'static str {
        "igram"
    }

    async fn resolve(&self, url: &str, timeout: Duration) -> BackendOutcome {
        self.attempt(url, timeout).await.into()
    }
}
