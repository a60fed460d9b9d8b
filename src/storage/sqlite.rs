//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the JobStore trait.

use crate::job::JobOptions;
use crate::state::JobStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{JobProgress, JobStore, StorageError, StorageResult};
use crate::storage::{JobRecord, PageRecord};
use crate::ScribeError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const JOB_COLUMNS: &str = "id, url, status, progress, total_pages, processed_pages, archive_path,
     follow_all_domains, include_images, single_page_only, content_selector, notify,
     created_at, completed_at";

const PAGE_COLUMNS: &str = "id, job_id, url, title, document_path, processed_at";

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(ScribeError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, ScribeError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, ScribeError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn current_status(&self, job_id: &str) -> StorageResult<JobStatus> {
        let status: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM jobs WHERE id = ?1",
                params![job_id],
                |row| row.get(0),
            )
            .optional()?;

        let status = status.ok_or_else(|| StorageError::JobNotFound(job_id.to_string()))?;
        JobStatus::from_db_string(&status)
            .ok_or_else(|| StorageError::Corrupt(format!("unknown job status '{}'", status)))
    }
}

fn job_from_row(row: &Row<'_>) -> rusqlite::Result<JobRecord> {
    let status: String = row.get(2)?;
    Ok(JobRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        // Unknown statuses only come from foreign writers; treat them as failed
        status: JobStatus::from_db_string(&status).unwrap_or(JobStatus::Failed),
        progress: row.get(3)?,
        total_pages: row.get(4)?,
        processed_pages: row.get(5)?,
        archive_path: row.get(6)?,
        options: JobOptions {
            follow_all_domains: row.get::<_, i64>(7)? != 0,
            include_images: row.get::<_, i64>(8)? != 0,
            single_page_only: row.get::<_, i64>(9)? != 0,
            content_selector: row.get(10)?,
            notify: row.get(11)?,
        },
        created_at: row.get(12)?,
        completed_at: row.get(13)?,
    })
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        id: row.get(0)?,
        job_id: row.get(1)?,
        url: row.get(2)?,
        title: row.get(3)?,
        document_path: row.get(4)?,
        processed_at: row.get(5)?,
    })
}

impl JobStore for SqliteStore {
    // ===== Jobs =====

    fn create_job(&mut self, job_id: &str, url: &str, options: &JobOptions) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO jobs (id, url, status, follow_all_domains, include_images,
             single_page_only, content_selector, notify, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                job_id,
                url,
                JobStatus::Pending.to_db_string(),
                options.follow_all_domains,
                options.include_images,
                options.single_page_only,
                options.content_selector,
                options.notify,
                now
            ],
        )?;

        if inserted == 0 {
            return Err(StorageError::DuplicateJob(job_id.to_string()));
        }
        Ok(())
    }

    fn get_job(&self, job_id: &str) -> StorageResult<JobRecord> {
        let sql = format!("SELECT {} FROM jobs WHERE id = ?1", JOB_COLUMNS);
        self.conn
            .query_row(&sql, params![job_id], job_from_row)
            .optional()?
            .ok_or_else(|| StorageError::JobNotFound(job_id.to_string()))
    }

    fn update_job_status(
        &mut self,
        job_id: &str,
        status: JobStatus,
        progress: JobProgress,
    ) -> StorageResult<()> {
        let current = self.current_status(job_id)?;
        if !current.can_transition_to(status) {
            return Err(StorageError::InvalidTransition {
                from: current,
                to: status,
            });
        }

        let completed_at = (status == JobStatus::Completed).then(|| Utc::now().to_rfc3339());

        self.conn.execute(
            "UPDATE jobs SET status = ?1,
             progress = COALESCE(?2, progress),
             total_pages = COALESCE(?3, total_pages),
             processed_pages = COALESCE(?4, processed_pages),
             completed_at = COALESCE(?5, completed_at)
             WHERE id = ?6",
            params![
                status.to_db_string(),
                progress.progress,
                progress.total_pages,
                progress.processed_pages,
                completed_at,
                job_id
            ],
        )?;
        Ok(())
    }

    fn set_archive_path(&mut self, job_id: &str, archive_path: &str) -> StorageResult<()> {
        let current = self.current_status(job_id)?;
        if current.is_terminal() {
            return Err(StorageError::InvalidTransition {
                from: current,
                to: current,
            });
        }

        self.conn.execute(
            "UPDATE jobs SET archive_path = ?1 WHERE id = ?2",
            params![archive_path, job_id],
        )?;
        Ok(())
    }

    // ===== Pages =====

    fn add_page(&mut self, job_id: &str, url: &str, title: Option<&str>) -> StorageResult<i64> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM pages WHERE job_id = ?1 AND url = ?2",
                params![job_id, url],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        self.conn.execute(
            "INSERT INTO pages (job_id, url, title) VALUES (?1, ?2, ?3)",
            params![job_id, url, title],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_page_document(&mut self, page_id: i64, document_path: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE pages SET document_path = ?1, processed_at = ?2 WHERE id = ?3",
            params![document_path, now, page_id],
        )?;

        if updated == 0 {
            return Err(StorageError::PageNotFound(page_id));
        }
        Ok(())
    }

    fn list_pages(&self, job_id: &str) -> StorageResult<Vec<PageRecord>> {
        let sql = format!(
            "SELECT {} FROM pages WHERE job_id = ?1 ORDER BY id ASC",
            PAGE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let pages = stmt
            .query_map(params![job_id], page_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pages)
    }

    fn count_pages(&self, job_id: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pages WHERE job_id = ?1",
            params![job_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
