//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client
//! - Applying the fixed politeness delay before each request
//! - Issuing a single GET per call and classifying the outcome
//!
//! # Known limitations
//!
//! The delay is a flat pause before every request, not a rate limiter: with
//! `N` concurrent units up to `N` requests can still leave at once.
//!
//! TLS certificate validation is switched off on purpose. This
//! crawler favors coverage of misconfigured sites over transport security and
//! must not be pointed at anything where that trade-off matters.

use crate::config::HttpConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, CONNECTION};
use reqwest::Client;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after any redirects the transport followed
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Server answered with a non-2xx status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Request could not be built, sent, or its body read
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Builds an HTTP client with the crawler's transport settings
///
/// Every request carries `Connection: close` and `Accept-Encoding: identity`,
/// idle connections are not kept, and invalid certificates are accepted.
///
/// # Example
///
/// ```
/// use sumi_atlas::config::HttpConfig;
/// use sumi_atlas::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(CONNECTION, HeaderValue::from_static("close"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .pool_max_idle_per_host(0)
        .danger_accept_invalid_certs(true)
        .build()
}

/// Issues GET requests after a fixed delay
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    delay: Duration,
}

impl Fetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            delay: config.request_delay(),
        })
    }

    /// Fetches one URL
    ///
    /// Waits the configured delay, then sends a single GET. There is no
    /// retry here; failures are reported and the engine decides what to do.
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx with readable body | `Success` |
    /// | Any other status | `HttpError` |
    /// | Malformed URL, connect error, timeout, body error | `NetworkError` |
    pub async fn fetch(&self, url: &str) -> FetchResult {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        fetch_url(&self.client, url).await
    }
}

/// Sends a single GET and classifies the response
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else if e.is_builder() {
                format!("Malformed request: {}", e)
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}
