//! Crawler coordinator - main crawl loop
//!
//! This module contains the breadth-first loop that ties together:
//! - The frontier queue and visited-set
//! - Scope checks against the seed URL
//! - Fetching, parsing, and link extraction
//! - The URL-count and wall-clock ceilings
//! - Reporting discovered pages through a [`CrawlSink`]

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{fetch_url, FetchResult};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::parse_html;
use crate::url::Scope;
use crate::ScribeError;
use reqwest::Client;
use std::time::Duration;
use tokio::time::{sleep_until, timeout_at, Instant};
use url::Url;

/// Receives pages as the crawler discovers them
///
/// Errors returned here are resource errors and abort the crawl.
pub trait CrawlSink {
    /// Records a successfully fetched page
    fn record_page(&mut self, url: &Url, title: Option<&str>) -> Result<(), ScribeError>;

    /// Called after each recorded page with the visited count and URL ceiling
    fn report_progress(&mut self, visited: usize, max_urls: usize) -> Result<(), ScribeError>;
}

/// Bounds for one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    pub max_urls: usize,
    pub max_crawl_time: Duration,
    pub request_delay: Duration,
}

impl CrawlLimits {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_urls: config.max_urls,
            max_crawl_time: Duration::from_secs(config.max_crawl_time),
            request_delay: Duration::from_millis(config.request_delay),
        }
    }
}

/// Why the crawl loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    FrontierExhausted,
    UrlLimit,
    TimeLimit,
}

/// Summary of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Every URL that was dequeued and attempted, in visit order
    pub visited: Vec<Url>,
    /// Pages handed to the sink
    pub pages_recorded: usize,
    pub stop_reason: StopReason,
}

/// Sequential breadth-first crawler
pub struct Crawler {
    client: Client,
    limits: CrawlLimits,
}

impl Crawler {
    pub fn new(client: Client, limits: CrawlLimits) -> Self {
        Self { client, limits }
    }

    /// Crawls outward from `seed` until a ceiling is hit or nothing is left
    ///
    /// One fetch is in flight at a time and consecutive attempts are spaced by
    /// the request delay. Every wait is cut short by the wall-clock deadline,
    /// so the call returns within `max_crawl_time`.
    pub async fn crawl<S: CrawlSink>(
        &self,
        seed: &Url,
        scope: Scope,
        sink: &mut S,
    ) -> Result<CrawlOutcome, ScribeError> {
        let deadline = Instant::now() + self.limits.max_crawl_time;
        let mut frontier = Frontier::new(seed.clone());

        tracing::info!(
            "Starting crawl of {} (max {} URLs, {:?})",
            seed,
            self.limits.max_urls,
            self.limits.max_crawl_time
        );

        let (pages_recorded, stop_reason) = self
            .run_loop(seed, scope, &mut frontier, deadline, sink)
            .await?;

        tracing::info!(
            "Crawl finished ({:?}): {} visited, {} recorded, {} left in frontier",
            stop_reason,
            frontier.visited_count(),
            pages_recorded,
            frontier.pending_count()
        );

        Ok(CrawlOutcome {
            visited: frontier.into_visited(),
            pages_recorded,
            stop_reason,
        })
    }

    async fn run_loop<S: CrawlSink>(
        &self,
        seed: &Url,
        scope: Scope,
        frontier: &mut Frontier,
        deadline: Instant,
        sink: &mut S,
    ) -> Result<(usize, StopReason), ScribeError> {
        let mut pages_recorded = 0;
        let mut last_attempt: Option<Instant> = None;

        loop {
            if frontier.visited_count() >= self.limits.max_urls {
                return Ok((pages_recorded, StopReason::UrlLimit));
            }
            if Instant::now() >= deadline {
                return Ok((pages_recorded, StopReason::TimeLimit));
            }

            let Some(url) = frontier.pop() else {
                return Ok((pages_recorded, StopReason::FrontierExhausted));
            };

            if frontier.is_visited(&url) {
                continue;
            }
            if !scope.allows(seed, &url) {
                tracing::debug!("Skipping out-of-scope URL {}", url);
                continue;
            }

            if let Some(previous) = last_attempt {
                let ready_at = previous + self.limits.request_delay;
                if ready_at >= deadline {
                    sleep_until(deadline).await;
                    return Ok((pages_recorded, StopReason::TimeLimit));
                }
                sleep_until(ready_at).await;
            }

            frontier.mark_visited(&url);
            last_attempt = Some(Instant::now());

            let result = match timeout_at(deadline, fetch_url(&self.client, &url)).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!("Crawl time limit reached while fetching {}", url);
                    return Ok((pages_recorded, StopReason::TimeLimit));
                }
            };

            let body = match result {
                FetchResult::Success { body, .. } => body,
                failure => {
                    tracing::warn!(
                        "Skipping {}: {}",
                        url,
                        failure.failure_reason().unwrap_or_default()
                    );
                    continue;
                }
            };

            // Links resolve against the requested URL, not the redirect target
            let parsed = parse_html(&body, &url);
            sink.record_page(&url, parsed.title.as_deref())?;
            pages_recorded += 1;
            sink.report_progress(frontier.visited_count(), self.limits.max_urls)?;

            tracing::info!(
                "Crawled {} ({} links, {}/{} visited)",
                url,
                parsed.links.len(),
                frontier.visited_count(),
                self.limits.max_urls
            );

            for link in parsed.links {
                if frontier.visited_count() >= self.limits.max_urls {
                    break;
                }
                if !scope.allows(seed, &link) {
                    tracing::debug!("Not following out-of-scope link {}", link);
                    continue;
                }
                frontier.enqueue(link);
            }
        }
    }
}
