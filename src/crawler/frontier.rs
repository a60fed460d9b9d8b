//! Crawl frontier: FIFO queue plus visited-set
//!
//! One `Frontier` belongs to one crawl run and is handed to the crawl loop by
//! `&mut`, so no locking is involved.

use std::collections::{HashSet, VecDeque};
use url::Url;

/// Breadth-first work queue for a single crawl
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<Url>,
    queued: HashSet<Url>,
    visited: HashSet<Url>,
    visit_order: Vec<Url>,
}

impl Frontier {
    /// Creates a frontier seeded with one URL
    pub fn new(seed: Url) -> Self {
        let mut frontier = Self::default();
        frontier.enqueue(seed);
        frontier
    }

    /// Adds a URL to the back of the queue
    ///
    /// Returns false if the URL was already visited or is already waiting.
    pub fn enqueue(&mut self, url: Url) -> bool {
        if self.visited.contains(&url) || self.queued.contains(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// Pops the oldest queued URL
    pub fn pop(&mut self) -> Option<Url> {
        let url = self.queue.pop_front()?;
        self.queued.remove(&url);
        Some(url)
    }

    /// Marks a URL visited; returns false if it already was
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        if !self.visited.insert(url.clone()) {
            return false;
        }
        self.visit_order.push(url.clone());
        true
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Consumes the frontier, returning visited URLs in visit order
    pub fn into_visited(self) -> Vec<Url> {
        self.visit_order
    }
}
