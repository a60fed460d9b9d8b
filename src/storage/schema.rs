//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Site-Scribe database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per submitted job
CREATE TABLE IF NOT EXISTS jobs (
    id TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    progress INTEGER NOT NULL DEFAULT 0,
    total_pages INTEGER NOT NULL DEFAULT 0,
    processed_pages INTEGER NOT NULL DEFAULT 0,
    archive_path TEXT,
    follow_all_domains INTEGER NOT NULL DEFAULT 0,
    include_images INTEGER NOT NULL DEFAULT 0,
    single_page_only INTEGER NOT NULL DEFAULT 0,
    content_selector TEXT,
    notify TEXT,
    created_at TEXT NOT NULL,
    completed_at TEXT
);

-- Pages discovered for a job
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    job_id TEXT NOT NULL REFERENCES jobs(id),
    url TEXT NOT NULL,
    title TEXT,
    document_path TEXT,
    processed_at TEXT,
    UNIQUE(job_id, url)
);

CREATE INDEX IF NOT EXISTS idx_pages_job ON pages(job_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
