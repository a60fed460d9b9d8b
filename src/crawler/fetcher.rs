//! HTTP fetcher implementation
//!
//! This module handles all plain HTTP requests, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - GET requests for crawl pages (only 2xx bodies count)
//! - GET requests for document generation (any body the server returns)
//! - Binary downloads for page images
//! - Error classification

use crate::config::FetchConfig;
use crate::ScribeError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Response was not markup (image, PDF, ...)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, DNS, ...)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Returns true for [`FetchResult::Success`]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Short description of a failure, for logs
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::ContentMismatch { content_type } => {
                Some(format!("expected HTML, got {}", content_type))
            }
            Self::HttpError { status_code } => Some(format!("HTTP {}", status_code)),
            Self::NetworkError { error } => Some(error.clone()),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetch configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use site_scribe::config::FetchConfig;
/// use site_scribe::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout))
        .connect_timeout(Duration::from_secs(config.timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page for crawling
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with markup | Success |
/// | 2xx with a non-text Content-Type | ContentMismatch |
/// | any other status | HttpError |
/// | timeout, connect, DNS, body read | NetworkError |
pub async fn fetch_url(client: &Client, url: &Url) -> FetchResult {
    fetch(client, url, false).await
}

/// Fetches a page for document generation
///
/// Unlike [`fetch_url`], error statuses still yield their body: a browser
/// would render the error page, so the document reflects what the user sees.
pub async fn fetch_document(client: &Client, url: &Url) -> FetchResult {
    fetch(client, url, true).await
}

async fn fetch(client: &Client, url: &Url, accept_error_status: bool) -> FetchResult {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(&e),
    };

    let status = response.status();
    if !status.is_success() && !accept_error_status {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    if !is_markup(&content_type) {
        return FetchResult::ContentMismatch { content_type };
    }

    let final_url = response.url().clone();
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

/// Downloads a binary resource such as an image
pub async fn fetch_bytes(client: &Client, url: &Url) -> Result<Vec<u8>, ScribeError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|source| http_error(url, source))?;

    let bytes = response
        .bytes()
        .await
        .map_err(|source| http_error(url, source))?;
    Ok(bytes.to_vec())
}

fn http_error(url: &Url, source: reqwest::Error) -> ScribeError {
    if source.is_timeout() {
        ScribeError::Timeout {
            url: url.to_string(),
        }
    } else {
        ScribeError::Http {
            url: url.to_string(),
            source,
        }
    }
}

/// Servers that omit Content-Type are given the benefit of the doubt
fn is_markup(content_type: &str) -> bool {
    content_type.is_empty()
        || content_type.contains("html")
        || content_type.contains("xml")
        || content_type.starts_with("text/")
}

fn classify_error(e: &reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    };
    FetchResult::NetworkError { error }
}
