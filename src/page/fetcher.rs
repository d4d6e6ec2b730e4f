//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made against the listing site:
//! - Building an HTTP client that presents itself like a regular browser
//! - GET requests for listing pages and detail pages
//! - Error classification (status, timeout, network, body)

use crate::config::HttpConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by a [`PageFetcher`]
///
/// A successful fetch of an empty page is `Ok(String::new())`, never an error.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

impl FetchError {
    /// The URL the failed request was made for
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. }
            | Self::Timeout { url }
            | Self::Network { url, .. }
            | Self::Body { url, .. } => url,
        }
    }
}

/// Source of raw page content
///
/// The watcher only depends on this trait, so tests and alternative
/// transports can stand in for [`HttpFetcher`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the page at `url` and returns its body
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// [`PageFetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher from an already configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with browser-like headers and the given request timeout
    pub fn from_config(config: &HttpConfig, timeout: Duration) -> crate::Result<Self> {
        Ok(Self::new(build_http_client(config, timeout)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        fetch_url(&self.client, url).await
    }
}

/// Builds an HTTP client that sends browser-like request headers
///
/// The listing site rejects requests that do not look like they come from
/// its own frontend, so besides the user agent the client always sends the
/// `Accept`, `Accept-Language`, `x-nextjs-data` and `Sec-Fetch-*` headers.
/// Compression (`Accept-Encoding`) is negotiated by reqwest itself.
///
/// # Example
///
/// ```no_run
/// use ad_watcher::config::HttpConfig;
/// use ad_watcher::page::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&HttpConfig::default(), Duration::from_secs(20)).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig, timeout: Duration) -> crate::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_str(&config.accept_language)?,
    );
    headers.insert(
        HeaderName::from_static("x-nextjs-data"),
        HeaderValue::from_static("1"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("empty"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("cors"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("same-origin"),
    );

    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()?;

    Ok(client)
}

/// Fetches a URL and classifies failures
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Ok(body)` (possibly empty) |
/// | Any other status | `FetchError::Status` |
/// | Client timeout | `FetchError::Timeout` |
/// | Connection / TLS / DNS error | `FetchError::Network` |
/// | Body could not be decoded | `FetchError::Body` |
pub async fn fetch_url(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| FetchError::Body {
        url: url.to_string(),
        message: e.to_string(),
    })
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
