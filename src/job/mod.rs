//! Job orchestration
//!
//! A job takes a seed URL through crawl, per-page document generation and
//! archive packaging, persisting status and progress as it goes:
//! - `orchestrator` runs one job through the state machine
//! - `manager` creates jobs and runs each on its own tokio task
//! - `progress` maps pipeline position to the 0-100 progress value
//! - `notify` is the hook fired after a job completes

mod manager;
mod notify;
mod orchestrator;
mod progress;

pub use manager::JobManager;
pub use notify::{LogNotifier, Notifier};
pub use orchestrator::Orchestrator;
pub use progress::{crawl_progress, processing_progress, COMPLETE, CRAWL_DONE, PROCESSING_DONE};

use crate::storage::{JobStore, StorageResult};
use crate::ScribeError;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Per-job options chosen at submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobOptions {
    /// Follow links to any host instead of only the seed's host
    pub follow_all_domains: bool,

    /// Save images next to each document and reference them
    pub include_images: bool,

    /// Convert only the seed page
    pub single_page_only: bool,

    /// CSS selector for the main content of each page
    pub content_selector: Option<String>,

    /// Where to send the completion notice
    pub notify: Option<String>,
}

/// Runs `f` against the locked store
pub(crate) fn with_store<S, T>(
    store: &Mutex<S>,
    f: impl FnOnce(&mut S) -> StorageResult<T>,
) -> Result<T, ScribeError>
where
    S: JobStore,
{
    let mut guard = store
        .lock()
        .map_err(|e| ScribeError::Storage(format!("job store lock poisoned: {}", e)))?;
    Ok(f(&mut *guard)?)
}
