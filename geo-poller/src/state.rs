//! Poll state
//!
//! The snapshot a poller exposes to its caller, and the transitions the poll
//! loop applies to it. Every mutation checks that the poller is still active,
//! so nothing a late response carries can change a finished or disposed poller.

use std::fmt;

use geo_core::{Category, JobId, JobState, JobStatus};

/// Lifecycle of a single poller instance
///
/// `Active` is the only non-terminal phase. Once a poller leaves it, it never
/// transitions again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollPhase {
    /// Polling continues
    Active,
    /// The backend reported `completed`
    Completed,
    /// The backend reported `failed`
    Failed,
    /// The backend reported `cancelled`
    Cancelled,
    /// A cancel request was accepted and local polling stopped
    CancelRequested,
    /// Too many consecutive status fetches failed
    GaveUp,
    /// The caller tore the poller down
    Disposed,
}

impl PollPhase {
    pub fn is_terminal(self) -> bool {
        self != Self::Active
    }

    /// Moves to `next` unless already terminal. Returns whether it moved.
    pub(crate) fn transition(&mut self, next: PollPhase) -> bool {
        if self.is_terminal() || next == *self {
            return false;
        }
        *self = next;
        true
    }

    /// Phase a poller enters when the backend reports `state`
    pub fn for_job_state(state: JobState) -> Option<PollPhase> {
        match state {
            JobState::Completed => Some(Self::Completed),
            JobState::Failed => Some(Self::Failed),
            JobState::Cancelled => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for PollPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::CancelRequested => "cancel requested",
            Self::GaveUp => "gave up",
            Self::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

/// What applying a status fetch did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Applied {
    /// Stale or arrived after the poller stopped
    Ignored,
    /// Snapshot replaced, job still active
    Updated,
    /// Snapshot replaced and the poller reached a terminal phase
    Terminal(PollPhase),
}

/// What recording a failed status fetch did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FetchFailure {
    Ignored,
    Recorded(u32),
    GaveUp(u32),
}

/// Everything a poller exposes about the job it tracks
#[derive(Debug, Clone, PartialEq)]
pub struct PollState {
    pub job_id: JobId,
    pub phase: PollPhase,
    /// Latest applied status snapshot
    pub status: Option<JobStatus>,
    /// Categories in display order, empty until the first successful fetch
    pub categories: Vec<Category>,
    /// Failure message reported by the job itself. Permanent.
    pub error: Option<String>,
    /// Last status-fetch error, cleared by the next success or by dismissing it
    pub fetch_error: Option<String>,
    /// The last fetch error is one retrying is unlikely to fix, such as an
    /// unknown job or rejected credentials. Viewers may offer to stop watching.
    pub fetch_error_permanent: bool,
    /// Last failed cancel request, cleared by a successful one or by dismissing it
    pub cancel_error: Option<String>,
    /// A cancel request was accepted by the backend
    pub cancel_requested: bool,
    pub consecutive_failures: u32,
    /// Status fetches issued so far
    pub polls: u64,
    /// Sequence number of the newest applied snapshot
    pub last_applied: u64,
}

impl PollState {
    pub(crate) fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            phase: PollPhase::Active,
            status: None,
            categories: Vec::new(),
            error: None,
            fetch_error: None,
            fetch_error_permanent: false,
            cancel_error: None,
            cancel_requested: false,
            consecutive_failures: 0,
            polls: 0,
            last_applied: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == PollPhase::Active
    }

    /// Backend state of the latest snapshot
    pub fn job_state(&self) -> Option<JobState> {
        self.status.as_ref().map(|s| s.status)
    }

    /// Progress of the latest snapshot, 0 before the first one
    pub fn progress(&self) -> f64 {
        self.status
            .as_ref()
            .map(JobStatus::clamped_progress)
            .unwrap_or(0.0)
    }

    /// Counts a status fetch about to be issued
    pub(crate) fn begin_poll(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.polls += 1;
        true
    }

    /// Applies the status fetched by request number `seq`
    pub(crate) fn apply_status(&mut self, seq: u64, status: JobStatus) -> Applied {
        if !self.is_active() || seq <= self.last_applied {
            return Applied::Ignored;
        }

        self.last_applied = seq;
        self.fetch_error = None;
        self.fetch_error_permanent = false;
        self.consecutive_failures = 0;

        let next = PollPhase::for_job_state(status.status);
        if next == Some(PollPhase::Failed) {
            self.error = Some(status.failure_message().to_string());
        }
        self.status = Some(status);

        match next {
            Some(phase) => {
                self.phase.transition(phase);
                Applied::Terminal(phase)
            }
            None => Applied::Updated,
        }
    }

    /// Records a failed status fetch
    pub(crate) fn record_fetch_error(
        &mut self,
        seq: u64,
        message: String,
        permanent: bool,
        give_up_after: Option<u32>,
    ) -> FetchFailure {
        if !self.is_active() || seq <= self.last_applied {
            return FetchFailure::Ignored;
        }

        self.fetch_error = Some(message);
        self.fetch_error_permanent = permanent;
        self.consecutive_failures += 1;

        match give_up_after {
            Some(limit) if self.consecutive_failures >= limit => {
                self.phase.transition(PollPhase::GaveUp);
                FetchFailure::GaveUp(self.consecutive_failures)
            }
            _ => FetchFailure::Recorded(self.consecutive_failures),
        }
    }

    /// Replaces the category list. Returns whether anything changed.
    pub(crate) fn apply_categories(&mut self, categories: Vec<Category>) -> bool {
        if !self.is_active() || self.categories == categories {
            return false;
        }
        self.categories = categories;
        true
    }

    /// Records an accepted cancel request, stopping locally when `stop` is set
    pub(crate) fn cancel_accepted(&mut self, stop: bool) -> bool {
        if !self.is_active() {
            return false;
        }
        self.cancel_error = None;
        self.cancel_requested = true;
        if stop {
            self.phase.transition(PollPhase::CancelRequested);
        }
        true
    }

    /// Records a failed cancel request. The phase is left alone.
    pub(crate) fn record_cancel_error(&mut self, message: String) -> bool {
        if !self.is_active() {
            return false;
        }
        self.cancel_error = Some(message);
        true
    }

    /// Hides the fetch warning. The failure count is kept.
    pub(crate) fn dismiss_fetch_error(&mut self) -> bool {
        if !self.is_active() || self.fetch_error.is_none() {
            return false;
        }
        self.fetch_error = None;
        self.fetch_error_permanent = false;
        true
    }

    pub(crate) fn dismiss_cancel_error(&mut self) -> bool {
        self.is_active() && self.cancel_error.take().is_some()
    }

    pub(crate) fn dispose(&mut self) -> bool {
        self.phase.transition(PollPhase::Disposed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> JobId {
        JobId::new(42).unwrap()
    }

    fn status(state: JobState) -> JobStatus {
        JobStatus {
            id: job(),
            status: state,
            total_queries: 10,
            completed_queries: 0,
            failed_queries: 0,
            progress_percentage: 0.0,
            started_at: None,
            completed_at: None,
            elapsed_seconds: None,
            error_message: None,
        }
    }

    #[test]
    fn test_terminal_phase_is_final() {
        let mut phase = PollPhase::Active;
        assert!(phase.transition(PollPhase::Completed));
        assert!(!phase.transition(PollPhase::Disposed));
        assert!(!phase.transition(PollPhase::Active));
        assert_eq!(phase, PollPhase::Completed);
    }

    #[test]
    fn test_active_status_updates_snapshot() {
        let mut state = PollState::new(job());
        assert_eq!(
            state.apply_status(1, status(JobState::Pending)),
            Applied::Updated
        );
        assert_eq!(state.job_state(), Some(JobState::Pending));
        assert!(state.is_active());
        assert_eq!(state.last_applied, 1);
    }

    #[test]
    fn test_stale_response_ignored() {
        let mut state = PollState::new(job());
        state.apply_status(2, status(JobState::ExecutingQueries));

        assert_eq!(
            state.apply_status(1, status(JobState::Pending)),
            Applied::Ignored
        );
        assert_eq!(state.job_state(), Some(JobState::ExecutingQueries));
    }

    #[test]
    fn test_failed_status_keeps_message_verbatim() {
        let mut state = PollState::new(job());
        let mut failed = status(JobState::Failed);
        failed.error_message = Some("rate limit exceeded".to_string());

        assert_eq!(
            state.apply_status(1, failed),
            Applied::Terminal(PollPhase::Failed)
        );
        assert_eq!(state.error.as_deref(), Some("rate limit exceeded"));
        assert!(!state.is_active());
    }

    #[test]
    fn test_failed_status_without_message_uses_fallback() {
        let mut state = PollState::new(job());
        state.apply_status(1, status(JobState::Failed));
        assert_eq!(
            state.error.as_deref(),
            Some(geo_core::domain::job::GENERIC_FAILURE_MESSAGE)
        );
    }

    #[test]
    fn test_cancelled_is_terminal_without_error() {
        let mut state = PollState::new(job());
        assert_eq!(
            state.apply_status(1, status(JobState::Cancelled)),
            Applied::Terminal(PollPhase::Cancelled)
        );
        assert!(state.error.is_none());
    }

    #[test]
    fn test_nothing_applies_after_terminal() {
        let mut state = PollState::new(job());
        state.apply_status(1, status(JobState::Completed));

        assert_eq!(
            state.apply_status(2, status(JobState::ExecutingQueries)),
            Applied::Ignored
        );
        assert_eq!(
            state.record_fetch_error(3, "boom".into(), false, None),
            FetchFailure::Ignored
        );
        assert!(!state.begin_poll());
        assert!(!state.dispose());
        assert_eq!(state.phase, PollPhase::Completed);
    }

    #[test]
    fn test_fetch_errors_count_until_success() {
        let mut state = PollState::new(job());
        assert_eq!(
            state.record_fetch_error(1, "timeout".into(), false, None),
            FetchFailure::Recorded(1)
        );
        assert_eq!(
            state.record_fetch_error(2, "timeout".into(), false, None),
            FetchFailure::Recorded(2)
        );
        assert!(state.is_active());

        state.apply_status(3, status(JobState::Pending));
        assert_eq!(state.consecutive_failures, 0);
        assert!(state.fetch_error.is_none());
    }

    #[test]
    fn test_permanent_fetch_error_cleared_by_success() {
        let mut state = PollState::new(job());
        state.record_fetch_error(1, "not found".into(), true, None);
        assert!(state.fetch_error_permanent);
        assert!(state.is_active());

        state.record_fetch_error(2, "timeout".into(), false, None);
        assert!(!state.fetch_error_permanent);

        state.record_fetch_error(3, "not found".into(), true, None);
        state.apply_status(4, status(JobState::Pending));
        assert!(!state.fetch_error_permanent);
        assert!(state.fetch_error.is_none());
    }

    #[test]
    fn test_dismissing_warnings() {
        let mut state = PollState::new(job());
        assert!(!state.dismiss_fetch_error());

        state.record_fetch_error(1, "timeout".into(), true, None);
        state.record_cancel_error("connection refused".into());
        assert!(state.dismiss_fetch_error());
        assert!(state.dismiss_cancel_error());
        assert!(state.fetch_error.is_none());
        assert!(!state.fetch_error_permanent);
        assert!(state.cancel_error.is_none());
        assert_eq!(state.consecutive_failures, 1);
        assert!(state.is_active());

        state.record_fetch_error(2, "timeout".into(), false, None);
        assert_eq!(state.fetch_error.as_deref(), Some("timeout"));
        assert_eq!(state.consecutive_failures, 2);
    }

    #[test]
    fn test_gives_up_at_threshold() {
        let mut state = PollState::new(job());
        state.record_fetch_error(1, "down".into(), false, Some(2));
        assert_eq!(
            state.record_fetch_error(2, "down".into(), false, Some(2)),
            FetchFailure::GaveUp(2)
        );
        assert_eq!(state.phase, PollPhase::GaveUp);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_cancel_error_does_not_touch_phase() {
        let mut state = PollState::new(job());
        assert!(state.record_cancel_error("connection refused".into()));
        assert!(state.is_active());
        assert!(state.error.is_none());
        assert_eq!(state.cancel_error.as_deref(), Some("connection refused"));

        assert!(state.cancel_accepted(false));
        assert!(state.is_active());
        assert!(state.cancel_requested);
        assert!(state.cancel_error.is_none());

        assert!(state.cancel_accepted(true));
        assert_eq!(state.phase, PollPhase::CancelRequested);
    }

    #[test]
    fn test_dispose_blocks_all_updates() {
        let mut state = PollState::new(job());
        state.apply_status(1, status(JobState::Pending));
        assert!(state.dispose());

        assert_eq!(
            state.apply_status(2, status(JobState::Completed)),
            Applied::Ignored
        );
        assert!(!state.apply_categories(Vec::new()));
        assert!(!state.record_cancel_error("late".into()));
        assert_eq!(state.job_state(), Some(JobState::Pending));
        assert_eq!(state.phase, PollPhase::Disposed);
    }
}
