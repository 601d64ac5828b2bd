//! Error types for the job poller

use geo_client::ClientError;
use geo_core::{InvalidJobId, JobId};
use thiserror::Error;

use crate::state::PollPhase;

/// Result type alias for poller operations
pub type Result<T> = std::result::Result<T, PollerError>;

/// Errors returned to callers of the poller
///
/// Failures of the poll loop itself never show up here; they are recorded
/// on [`PollState`](crate::PollState) instead.
#[derive(Debug, Error)]
pub enum PollerError {
    #[error(transparent)]
    InvalidJobId(#[from] InvalidJobId),

    /// The handle already reached a terminal phase
    #[error("job {job_id} is no longer being polled ({phase})")]
    NotActive { job_id: JobId, phase: PollPhase },

    /// The cancel request did not reach or was rejected by the backend.
    /// Polling continues and the request may be retried.
    #[error("failed to cancel job {job_id}: {source}")]
    Cancel {
        job_id: JobId,
        #[source]
        source: ClientError,
    },

    #[error("invalid poller configuration: {0}")]
    InvalidConfig(String),
}
