//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Message shown when the backend reports a failure without explaining it
pub const GENERIC_FAILURE_MESSAGE: &str = "Analysis job failed";

/// Rejected job identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidJobId {
    #[error("job id must be a positive integer, got {0}")]
    NotPositive(i64),

    #[error("job id is not an integer: {0:?}")]
    NotANumber(String),
}

/// Identifier of a backend analysis job
///
/// Always positive. Serialized as a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct JobId(i64);

impl JobId {
    pub fn new(id: i64) -> Result<Self, InvalidJobId> {
        if id <= 0 {
            return Err(InvalidJobId::NotPositive(id));
        }
        Ok(Self(id))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<JobId> for i64 {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = InvalidJobId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<i64>()
            .map_err(|_| InvalidJobId::NotANumber(s.to_string()))?;
        Self::new(id)
    }
}

impl TryFrom<i64> for JobId {
    type Error = InvalidJobId;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

/// Lifecycle state of an analysis job
///
/// `pending → generating_categories → expanding_queries → executing_queries`
/// are active; `completed`, `failed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    GeneratingCategories,
    ExpandingQueries,
    ExecutingQueries,
    Completed,
    Failed,
    Cancelled,
    /// A state this client does not know about yet. Treated as active.
    #[serde(other)]
    Unknown,
}

impl JobState {
    /// No further transition happens once a job is here
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Polling continues and cancellation is offered
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// The job has started producing categorization output
    pub fn produces_categories(self) -> bool {
        matches!(
            self,
            Self::GeneratingCategories | Self::ExpandingQueries | Self::ExecutingQueries
        )
    }

    /// Wire representation of the state
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::GeneratingCategories => "generating_categories",
            Self::ExpandingQueries => "expanding_queries",
            Self::ExecutingQueries => "executing_queries",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status snapshot of a job as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub id: JobId,
    pub status: JobState,
    #[serde(default)]
    pub total_queries: u32,
    #[serde(default)]
    pub completed_queries: u32,
    #[serde(default)]
    pub failed_queries: u32,
    #[serde(default)]
    pub progress_percentage: f64,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// `None` until the job has started
    #[serde(default)]
    pub elapsed_seconds: Option<f64>,
    /// Only populated when `status` is `failed`
    #[serde(default)]
    pub error_message: Option<String>,
}

impl JobStatus {
    /// Queries neither completed nor failed yet
    ///
    /// The backend does not enforce `completed + failed <= total`, so this saturates.
    pub fn remaining_queries(&self) -> u32 {
        self.total_queries
            .saturating_sub(self.completed_queries)
            .saturating_sub(self.failed_queries)
    }

    /// Progress percentage clamped to `[0, 100]`
    pub fn clamped_progress(&self) -> f64 {
        if self.progress_percentage.is_nan() {
            return 0.0;
        }
        self.progress_percentage.clamp(0.0, 100.0)
    }

    /// Message to display for a failed job
    ///
    /// The backend's message verbatim, or a generic fallback when it is missing or blank.
    pub fn failure_message(&self) -> &str {
        match self.error_message.as_deref() {
            Some(msg) if !msg.trim().is_empty() => msg,
            _ => GENERIC_FAILURE_MESSAGE,
        }
    }
}
