//! Storage traits and error types
//!
//! The job orchestrator only talks to persistence through [`JobStore`], so the
//! SQLite backend can be swapped for whatever the hosting service uses.

use crate::job::JobOptions;
use crate::state::JobStatus;
use crate::storage::{JobRecord, PageRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Page not found: {0}")]
    PageNotFound(i64),

    #[error("Job already exists: {0}")]
    DuplicateJob(String),

    #[error("Invalid job transition: {from:?} -> {to:?}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Progress fields written together with a status change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobProgress {
    pub progress: Option<u8>,
    pub total_pages: Option<u32>,
    pub processed_pages: Option<u32>,
}

impl JobProgress {
    pub fn new(progress: u8, total_pages: u32, processed_pages: u32) -> Self {
        Self {
            progress: Some(progress),
            total_pages: Some(total_pages),
            processed_pages: Some(processed_pages),
        }
    }
}

/// Trait for job persistence backends
pub trait JobStore {
    // ===== Jobs =====

    /// Creates a job in the `pending` state
    fn create_job(&mut self, job_id: &str, url: &str, options: &JobOptions) -> StorageResult<()>;

    /// Gets a job by ID
    fn get_job(&self, job_id: &str) -> StorageResult<JobRecord>;

    /// Moves a job to `status`, writing any provided progress fields
    ///
    /// Fails with [`StorageError::InvalidTransition`] when the state machine
    /// forbids the move; terminal jobs are never modified.
    fn update_job_status(
        &mut self,
        job_id: &str,
        status: JobStatus,
        progress: JobProgress,
    ) -> StorageResult<()>;

    /// Records where the job's archive was written
    fn set_archive_path(&mut self, job_id: &str, archive_path: &str) -> StorageResult<()>;

    // ===== Pages =====

    /// Records a page for a job, returning the existing ID if the URL is known
    fn add_page(&mut self, job_id: &str, url: &str, title: Option<&str>) -> StorageResult<i64>;

    /// Stores the generated document path and the processing timestamp
    fn update_page_document(&mut self, page_id: i64, document_path: &str) -> StorageResult<()>;

    /// Lists a job's pages in discovery order
    fn list_pages(&self, job_id: &str) -> StorageResult<Vec<PageRecord>>;

    /// Counts a job's pages
    fn count_pages(&self, job_id: &str) -> StorageResult<u64>;
}
