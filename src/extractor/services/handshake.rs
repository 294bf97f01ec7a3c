//! Token-handshake scrapers (ssstik, snaptik)
//!
//! Both services follow the same dance: load the landing page, lift a one-time
//! token out of a hidden form field, post it back with the video URL, then
//! scrape the no-watermark link out of whatever comes back.

use crate::extractor::models::{BackendOutcome, MediaLocator};
use crate::extractor::services::{attempt_client, decode_link, expect_ok, is_json};
use crate::extractor::traits::BackendAdapter;
use crate::utils::error::BackendError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tracing::debug;

static SSSTIK_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"name="_token"\s+value="([^"]+)""#).unwrap());
static SSSTIK_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"href="(https://[^"]+\.mp4[^"]*)"[^>]*>\s*Without watermark"#).unwrap()
});
static SNAPTIK_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"name="token"\s+value="([^"]+)""#).unwrap());
static SNAPTIK_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href="(https://[^"]+\.mp4[^"]*)""#).unwrap());

/// Wire details of one handshake service.
#[derive(Debug)]
pub struct HandshakeProfile {
    pub id: &'static str,
    pub base_url: &'static str,
    pub landing_path: &'static str,
    pub submit_path: &'static str,
    pub token_field: &'static str,
    pub extra_fields: &'static [(&'static str, &'static str)],
    pub token_pattern: &'static Lazy<Regex>,
    pub link_pattern: &'static Lazy<Regex>,
    /// JSON key holding the link when the submission answers with JSON
    pub json_link_field: Option<&'static str>,
}

pub static SSSTIK: HandshakeProfile = HandshakeProfile {
    id: "ssstik",
    base_url: "https://ssstik.io",
    landing_path: "/",
    submit_path: "/abc?url=dl",
    token_field: "_token",
    extra_fields: &[("locale", "en")],
    token_pattern: &SSSTIK_TOKEN,
    link_pattern: &SSSTIK_LINK,
    json_link_field: Some("link"),
};

pub static SNAPTIK: HandshakeProfile = HandshakeProfile {
    id: "snaptik",
    base_url: "https://snaptik.app",
    landing_path: "/",
    submit_path: "/abc2.php",
    token_field: "token",
    extra_fields: &[],
    token_pattern: &SNAPTIK_TOKEN,
    link_pattern: &SNAPTIK_LINK,
    json_link_field: None,
};

pub struct TokenHandshakeAdapter {
    profile: &'static HandshakeProfile,
    base_url: String,
}

impl TokenHandshakeAdapter {
    pub fn new(profile: &'static HandshakeProfile) -> Self {
        Self {
            profile,
            base_url: profile.base_url.to_string(),
        }
    }

    pub fn ssstik() -> Self {
        Self::new(&SSSTIK)
    }

    pub fn snaptik() -> Self {
        Self::new(&SNAPTIK)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn attempt(&self, url: &str, timeout: Duration) -> Result<MediaLocator, BackendError> {
        let profile = self.profile;
        let client = attempt_client(true)?;

        let landing = client
            .get(self.endpoint(profile.landing_path))
            .timeout(timeout)
            .send()
            .await?;
        let html = expect_ok(landing, "landing page")?.text().await?;
        let token = extract_token(profile, &html)?;
        debug!("{} handshake token acquired", profile.id);

        let mut form: Vec<(&str, &str)> = vec![(profile.token_field, token), ("url", url.trim())];
        form.extend_from_slice(profile.extra_fields);

        let submission = client
            .post(self.endpoint(profile.submit_path))
            .form(&form)
            .timeout(timeout)
            .send()
            .await?;
        let submission = expect_ok(submission, "submission")?;
        let json = is_json(&submission);
        let body = submission.text().await?;

        let link = extract_link(profile, &body, json)?;
        MediaLocator::remote(&decode_link(&link)?)
    }
}

/// Pull the one-time token out of the landing page.
pub fn extract_token<'a>(
    profile: &HandshakeProfile,
    html: &'a str,
) -> Result<&'a str, BackendError> {
    profile
        .token_pattern
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            BackendError::Parse(format!(
                "{} landing page has no {} field",
                profile.id, profile.token_field
            ))
        })
}

/// Find the media link in a submission response (still percent-encoded).
pub fn extract_link(
    profile: &HandshakeProfile,
    body: &str,
    json: bool,
) -> Result<String, BackendError> {
    if let (true, Some(field)) = (json, profile.json_link_field) {
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| BackendError::Parse(format!("{} sent invalid JSON: {}", profile.id, e)))?;
        return value
            .get(field)
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                BackendError::Parse(format!("{} JSON has no {:?} field", profile.id, field))
            });
    }

    profile
        .link_pattern
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| BackendError::Parse(format!("{} response has no video link", profile.id)))
}

#[async_trait]
impl BackendAdapter for TokenHandshakeAdapter {
    fn id(&self) -> &'static str {
        self.profile.id
    }

    async fn resolve(&self, url: &str, timeout: Duration) -> BackendOutcome {
        self.attempt(url, timeout).await.into()
    }
}
