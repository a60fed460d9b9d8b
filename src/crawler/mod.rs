//! Crawler module for web page fetching and link discovery
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with error classification
//! - Rendered-DOM loading for document generation
//! - HTML parsing and link extraction
//! - The breadth-first frontier
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod renderer;

pub use coordinator::{CrawlLimits, CrawlOutcome, CrawlSink, Crawler, StopReason};
pub use fetcher::{build_http_client, fetch_bytes, fetch_document, fetch_url, FetchResult};
pub use frontier::Frontier;
pub use parser::{extract_title, parse_html, ParsedPage};
pub use renderer::{LoadedPage, PageLoader};
