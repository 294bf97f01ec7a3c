//! HTTP adapters for third-party scraping services
//!
//! Every adapter speaks a fixed, undocumented protocol that can change without
//! notice. Anything that doesn't match the expected shape is reported as a
//! parse failure rather than a crash.

pub mod cobalt;
pub mod handshake;
pub mod igram;
pub mod saveig;
pub mod tikwm;

use crate::utils::error::BackendError;
use reqwest::{Client, Response, StatusCode};

pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Fresh client for one attempt. With `cookies` the client keeps a private
/// cookie jar so a landing-page session carries over to the submission.
pub(crate) fn attempt_client(cookies: bool) -> Result<Client, BackendError> {
    Ok(Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .cookie_store(cookies)
        .build()?)
}

/// Anything but 200 means the service declined.
pub(crate) fn expect_ok(response: Response, step: &str) -> Result<Response, BackendError> {
    match response.status() {
        StatusCode::OK => Ok(response),
        status => Err(BackendError::NotFound(format!("{} returned {}", step, status))),
    }
}

/// Percent-decode a scraped link, undoing HTML `&amp;` escaping first.
pub(crate) fn decode_link(raw: &str) -> Result<String, BackendError> {
    urlencoding::decode(&raw.replace("&amp;", "&"))
        .map(|decoded| decoded.into_owned())
        .map_err(|e| BackendError::Parse(format!("link is not valid UTF-8 once decoded: {}", e)))
}

pub(crate) fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false)
}
