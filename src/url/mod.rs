//! URL handling module for Site-Scribe
//!
//! This module provides seed parsing, link resolution, crawl scope checks,
//! and the URL-to-path mapping used to lay out generated documents.

mod domain;
mod normalize;
mod slug;

pub use domain::{extract_domain, is_same_host};
pub use normalize::{parse_seed_url, resolve_href, resolve_resource};
pub use slug::{
    document_folder, document_relative_path, slugify, url_to_slug, DOCUMENT_EXTENSION,
    FALLBACK_SLUG, MAX_SLUG_LEN,
};

use ::url::Url;

/// Crawl scope policy deciding which discovered links are eligible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Only URLs on the seed's host
    SameHost,
    /// Any http(s) URL
    AllDomains,
}

impl Scope {
    /// Builds the scope from the job's follow-all-domains flag
    pub fn from_follow_all(follow_all_domains: bool) -> Self {
        if follow_all_domains {
            Self::AllDomains
        } else {
            Self::SameHost
        }
    }

    /// Returns true if `candidate` may be crawled from a crawl seeded at `seed`
    pub fn allows(&self, seed: &Url, candidate: &Url) -> bool {
        match self {
            Self::AllDomains => true,
            Self::SameHost => is_same_host(seed, candidate),
        }
    }
}
