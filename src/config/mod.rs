//! Configuration module for Site-Scribe
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use site_scribe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawler will visit at most {} URLs", config.crawler.max_urls);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, CrawlerConfig, FetchConfig, LayoutConfig, OutputConfig};

pub use parser::{load_config, parse_config};
