/// Job status definitions for the orchestration state machine
///
/// ```text
/// pending -> crawling -> processing -> completed
///               |            |
///               +--> failed <+
/// ```
use serde::Serialize;
use std::fmt;

/// Represents the current lifecycle status of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Job has been created but not started
    Pending,

    /// Crawler (or single-page fetch) is discovering pages
    Crawling,

    /// Documents are being generated for discovered pages
    Processing,

    /// Archive is ready
    Completed,

    /// Job hit an unrecoverable error
    Failed,
}

impl JobStatus {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if the state machine allows moving from `self` to `next`
    ///
    /// Re-entering the current non-terminal state is allowed so progress
    /// updates can be written alongside the status.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::Pending) => true,
            (Self::Pending, Self::Crawling) => true,
            (Self::Crawling, Self::Crawling) => true,
            (Self::Crawling, Self::Processing) => true,
            (Self::Processing, Self::Processing) => true,
            (Self::Processing, Self::Completed) => true,
            (Self::Crawling | Self::Processing, Self::Failed) => true,
            _ => false,
        }
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Crawling => "crawling",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "crawling" => Some(Self::Crawling),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns all possible statuses
    pub fn all_statuses() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Crawling,
            Self::Processing,
            Self::Completed,
            Self::Failed,
        ]
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
