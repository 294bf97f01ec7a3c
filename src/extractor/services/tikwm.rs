use crate::extractor::models::{BackendOutcome, MediaLocator};
use crate::extractor::services::{attempt_client, expect_ok};
use crate::extractor::traits::BackendAdapter;
use crate::utils::error::BackendError;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

pub const TIKWM_BASE: &str = "https://tikwm.com";

#[derive(Debug, Deserialize)]
struct TikwmResponse {
    code: Option<i64>,
    msg: Option<String>,
    data: Option<TikwmData>,
}

#[derive(Debug, Deserialize)]
struct TikwmData {
    play: Option<String>,
}

/// tikwm public API: form POST, `code == 0` and `data.play` on success.
pub struct TikwmAdapter {
    base_url: String,
}

impl Default for TikwmAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl TikwmAdapter {
    pub fn new() -> Self {
        Self::with_base_url(TIKWM_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn attempt(&self, url: &str, timeout: Duration) -> Result<MediaLocator, BackendError> {
        let client = attempt_client(false)?;
        let response = client
            .post(format!("{}/api/", self.base_url))
            .form(&[("url", url.trim()), ("hd", "1")])
            .timeout(timeout)
            .send()
            .await?;

        let body: TikwmResponse = expect_ok(response, "tikwm")?.json().await?;
        let play = interpret(body)?;
        MediaLocator::remote(&absolutize(&self.base_url, &play)?)
    }
}

fn interpret(body: TikwmResponse) -> Result<String, BackendError> {
    match body.code {
        Some(0) => {}
        Some(code) => {
            return Err(BackendError::NotFound(format!(
                "tikwm code {}: {}",
                code,
                body.msg.unwrap_or_default()
            )))
        }
        None => return Err(BackendError::Parse("tikwm response has no code".to_string())),
    }

    body.data
        .and_then(|data| data.play)
        .filter(|play| !play.trim().is_empty())
        .ok_or_else(|| BackendError::Parse("tikwm response has no data.play".to_string()))
}

/// tikwm sometimes hands back a path relative to its own host.
fn absolutize(base_url: &str, play: &str) -> Result<String, BackendError> {
    if play.starts_with("http://") || play.starts_with("https://") {
        return Ok(play.to_string());
    }
    let base = Url::parse(base_url)
        .map_err(|e| BackendError::Parse(format!("bad tikwm base url: {}", e)))?;
    base.join(play)
        .map(String::from)
        .map_err(|e| BackendError::Parse(format!("bad tikwm play path {:?}: {}", play, e)))
}

#[async_trait]
impl BackendAdapter for TikwmAdapter {
    fn id(&self) -> &'static str {
        "tikwm"
    }

    async fn resolve(&self, url: &str, timeout: Duration) -> BackendOutcome {
        self.attempt(url, timeout).await.into()
    }
}
