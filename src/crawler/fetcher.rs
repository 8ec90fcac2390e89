//! HTTP fetcher implementation
//!
//! This module handles all network requests for the crawler:
//! - The `Fetcher` seam workers download through
//! - Building a blocking HTTP client with the configured user agent
//! - Following redirects and reporting the final URL
//! - Error classification

use crate::config::UserAgentConfig;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while downloading a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("too many redirects from {url}")]
    Redirect { url: String },

    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("failed to read body of {url}: {reason}")]
    Body { url: String, reason: String },
}

impl FetchError {
    fn classify(url: &str, err: reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            FetchError::Timeout { url }
        } else if err.is_connect() {
            FetchError::Connect {
                url,
                reason: err.to_string(),
            }
        } else if err.is_redirect() {
            FetchError::Redirect { url }
        } else {
            FetchError::Request {
                url,
                reason: err.to_string(),
            }
        }
    }
}

/// A downloaded page
#[derive(Debug, Clone, Default)]
pub struct Response {
    /// HTTP status code
    pub status: u16,

    /// Final URL after redirects
    pub url: String,

    /// Raw body bytes
    pub body: Vec<u8>,

    /// Response headers, names lower-cased
    pub headers: HashMap<String, String>,
}

impl Response {
    /// Looks up a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Lower-cased `Content-Type`, or an empty string
    pub fn content_type(&self) -> String {
        self.header("content-type")
            .unwrap_or("")
            .to_ascii_lowercase()
    }

    /// True for a 200 with a non-empty `text/html` body
    pub fn is_html(&self) -> bool {
        self.status == 200 && !self.body.is_empty() && self.content_type().contains("text/html")
    }
}

/// Downloads a URL
///
/// Implementations are shared by every worker thread.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Response, FetchError>;
}

/// Blocking HTTP fetcher backed by `reqwest`
///
/// Must be built and dropped outside of an async context; the binary
/// creates it on a blocking thread.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher with the configured user agent
    ///
    /// # Arguments
    ///
    /// * `config` - The user agent configuration
    ///
    /// # Returns
    ///
    /// * `Ok(HttpFetcher)` - Successfully built HTTP client
    /// * `Err(reqwest::Error)` - Failed to build client
    pub fn new(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

/// Builds an HTTP client with proper configuration
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.name.trim())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Response, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::classify(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        let body = response.bytes().map_err(|e| FetchError::Body {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Response {
            status,
            url: final_url,
            body: body.to_vec(),
            headers,
        })
    }
}
