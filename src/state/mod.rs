//! State module for tracking job progress
//!
//! - `JobStatus`: lifecycle of a job (pending, crawling, processing, completed, failed)
//!   and the transitions allowed between those states

mod job_status;

pub use job_status::JobStatus;
