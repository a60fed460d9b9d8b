//! Progress scale
//!
//! Crawling fills 0-50, document generation 50-90, and completion jumps to 100.

/// Progress once crawling is done
pub const CRAWL_DONE: u8 = 50;

/// Progress once every page has a document
pub const PROCESSING_DONE: u8 = 90;

pub const COMPLETE: u8 = 100;

/// `floor(visited / max_urls * 50)`, capped at 50
pub fn crawl_progress(visited: usize, max_urls: usize) -> u8 {
    if max_urls == 0 {
        return CRAWL_DONE;
    }
    let scaled = visited.saturating_mul(CRAWL_DONE as usize) / max_urls;
    scaled.min(CRAWL_DONE as usize) as u8
}

/// `50 + floor(40 * processed / total)`
pub fn processing_progress(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return CRAWL_DONE;
    }
    let span = (PROCESSING_DONE - CRAWL_DONE) as usize;
    let scaled = processed.min(total) * span / total;
    CRAWL_DONE + scaled as u8
}
