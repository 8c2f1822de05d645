//! HTTP fetcher implementation
//!
//! This module handles the HTTP side of page discovery:
//! - Building the shared HTTP client with a proper user agent string
//! - GET requests for HTML pages under a per-request timeout
//! - Error classification shared with the document downloader

use crate::config::UserAgentConfig;
use reqwest::{Client, Response};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a single HTTP request did not produce a usable response
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("body transfer interrupted: {0}")]
    Body(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl FetchError {
    /// Classifies a reqwest error
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else if e.is_body() || e.is_decode() {
            FetchError::Body(e.to_string())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Timeouts are applied per request, since page fetches and document
/// downloads use different limits.
///
/// # Example
///
/// ```no_run
/// use paper_trawl::config::UserAgentConfig;
/// use paper_trawl::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sends a GET request and rejects non-2xx responses
pub(crate) async fn send_get(
    client: &Client,
    url: &Url,
    timeout: Duration,
) -> Result<Response, FetchError> {
    let response = client
        .get(url.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(&e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    Ok(response)
}

/// Fetches one HTML page and returns its body as text
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The page to fetch
/// * `timeout` - Upper bound for the whole request including the body
pub async fn fetch_page(client: &Client, url: &Url, timeout: Duration) -> Result<String, FetchError> {
    let response = send_get(client, url, timeout).await?;

    response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(&e))
}
