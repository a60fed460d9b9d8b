//! Storage module for persisting jobs and pages
//!
//! This module handles all database operations for Site-Scribe, including:
//! - SQLite database initialization and schema management
//! - Job lifecycle and progress persistence
//! - Per-job page records and their generated document paths

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{JobProgress, JobStore, StorageError, StorageResult};

use crate::job::JobOptions;
use crate::state::JobStatus;
use crate::ScribeError;
use serde::Serialize;
use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStore, ScribeError> {
    SqliteStore::new(path)
}

/// Represents a job in the database
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: String,
    pub url: String,
    pub status: JobStatus,
    pub progress: u8,
    pub total_pages: u32,
    pub processed_pages: u32,
    pub archive_path: Option<String>,
    pub options: JobOptions,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl JobRecord {
    /// Public view of the job, as served to status pollers
    pub fn snapshot(&self) -> JobSnapshot {
        let archive_url = match (self.status, &self.archive_path) {
            (JobStatus::Completed, Some(_)) => Some(format!("/api/jobs/{}/download", self.id)),
            _ => None,
        };

        JobSnapshot {
            status: self.status,
            progress: self.progress,
            total_pages: self.total_pages,
            processed_pages: self.processed_pages,
            archive_url,
        }
    }
}

/// Status view of a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub progress: u8,
    pub total_pages: u32,
    pub processed_pages: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_url: Option<String>,
}

/// Represents a page in the database
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub id: i64,
    pub job_id: String,
    pub url: String,
    pub title: Option<String>,
    pub document_path: Option<String>,
    pub processed_at: Option<String>,
}
