//! Page loading for document generation
//!
//! Documents are built from what a browser would show. With a WebDriver
//! endpoint configured the page is rendered by a real browser and its DOM is
//! read back; otherwise the raw HTTP body is used.

use crate::config::FetchConfig;
use crate::crawler::fetcher::{fetch_document, FetchResult};
use crate::ScribeError;
use fantoccini::{Client as WebDriverClient, ClientBuilder};
use reqwest::Client;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

/// Slack on top of the navigation and settle time for reading the DOM back
const SESSION_MARGIN: Duration = Duration::from_secs(10);

const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Markup of a loaded page
#[derive(Debug, Clone)]
pub struct LoadedPage {
    /// URL the content came from, after redirects
    pub final_url: Url,
    pub html: String,
}

/// Where page markup comes from
#[derive(Debug, Clone)]
pub enum PageLoader {
    /// Raw HTTP body
    Http(Client),

    /// Rendered DOM from a WebDriver session
    WebDriver {
        endpoint: String,
        render_timeout: Duration,
        settle_delay: Duration,
    },
}

impl PageLoader {
    /// Picks the loader the configuration asks for
    pub fn from_config(config: &FetchConfig, client: Client) -> Self {
        match &config.webdriver_url {
            Some(endpoint) => Self::WebDriver {
                endpoint: endpoint.clone(),
                render_timeout: Duration::from_secs(config.render_timeout),
                settle_delay: Duration::from_millis(config.settle_delay),
            },
            None => Self::Http(client),
        }
    }

    /// Loads a page's markup
    pub async fn load(&self, url: &Url) -> Result<LoadedPage, ScribeError> {
        match self {
            Self::Http(client) => load_http(client, url).await,
            Self::WebDriver {
                endpoint,
                render_timeout,
                settle_delay,
            } => render(endpoint, url, *render_timeout, *settle_delay).await,
        }
    }
}

async fn load_http(client: &Client, url: &Url) -> Result<LoadedPage, ScribeError> {
    match fetch_document(client, url).await {
        FetchResult::Success {
            final_url,
            status_code,
            body,
        } => {
            if status_code >= 400 {
                tracing::debug!("Using HTTP {} body for {}", status_code, url);
            }
            Ok(LoadedPage {
                final_url,
                html: body,
            })
        }
        other => Err(ScribeError::Render {
            url: url.to_string(),
            message: other
                .failure_reason()
                .unwrap_or_else(|| "unknown failure".to_string()),
        }),
    }
}

fn headless_capabilities() -> Map<String, Value> {
    let mut caps = Map::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": ["--headless=new", "--disable-gpu", "--no-sandbox"] }),
    );
    caps.insert(
        "moz:firefoxOptions".to_string(),
        json!({ "args": ["-headless"] }),
    );
    caps
}

async fn render(
    endpoint: &str,
    url: &Url,
    render_timeout: Duration,
    settle_delay: Duration,
) -> Result<LoadedPage, ScribeError> {
    let timed_out = || ScribeError::Timeout {
        url: url.to_string(),
    };

    let mut builder = ClientBuilder::native();
    builder.capabilities(headless_capabilities());
    let client = match timeout(render_timeout, builder.connect(endpoint)).await {
        Ok(Ok(client)) => client,
        Ok(Err(e)) => {
            return Err(ScribeError::Render {
                url: url.to_string(),
                message: format!("WebDriver session failed: {}", e),
            })
        }
        Err(_) => return Err(timed_out()),
    };

    // Navigation, settling and DOM reads share one session deadline
    let session_budget = render_timeout + settle_delay + SESSION_MARGIN;
    let result = match timeout(
        session_budget,
        read_rendered_dom(&client, url, render_timeout, settle_delay),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(timed_out()),
    };

    match timeout(CLOSE_TIMEOUT, client.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("Failed to close WebDriver session: {}", e),
        Err(_) => tracing::warn!("Timed out closing WebDriver session for {}", url),
    }

    result
}

async fn read_rendered_dom(
    client: &WebDriverClient,
    url: &Url,
    render_timeout: Duration,
    settle_delay: Duration,
) -> Result<LoadedPage, ScribeError> {
    match timeout(render_timeout, client.goto(url.as_str())).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            return Err(ScribeError::Render {
                url: url.to_string(),
                message: e.to_string(),
            })
        }
        Err(_) => {
            return Err(ScribeError::Timeout {
                url: url.to_string(),
            })
        }
    }

    // Let client-side scripts finish populating the DOM
    tokio::time::sleep(settle_delay).await;

    let html = client.source().await.map_err(|e| ScribeError::Render {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let final_url = client.current_url().await.unwrap_or_else(|_| url.clone());

    Ok(LoadedPage { final_url, html })
}
