//! Job poller
//!
//! Starts one background task per tracked job. Each task fetches the job's
//! status immediately, then once per interval, until the job reaches a
//! terminal state or the handle is disposed.

use std::sync::Arc;

use geo_client::JobApi;
use geo_core::{JobId, JobStatus};
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::callbacks::{CallbackSlots, Callbacks};
use crate::config::PollerConfig;
use crate::error::Result;
use crate::scheduler::handle::PollHandle;
use crate::state::{Applied, FetchFailure, PollPhase, PollState};

/// Starts pollers for analysis jobs
///
/// Cheap to keep around; every call to [`start`](Self::start) spawns an
/// independent poll loop that shares nothing with the others except the API
/// client.
#[derive(Clone)]
pub struct JobPoller {
    api: Arc<dyn JobApi>,
    config: PollerConfig,
}

impl JobPoller {
    /// Creates a new job poller
    pub fn new(api: Arc<dyn JobApi>, config: PollerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { api, config })
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Starts polling the job with the given raw identifier
    ///
    /// Fails only if `job_id` is not a positive integer. Must be called from
    /// within a tokio runtime.
    pub fn start(&self, job_id: i64, callbacks: Callbacks) -> Result<PollHandle> {
        let job_id = JobId::new(job_id)?;
        Ok(self.start_job(job_id, callbacks))
    }

    /// Starts polling an already validated job
    pub fn start_job(&self, job_id: JobId, callbacks: Callbacks) -> PollHandle {
        info!(
            "Starting poller for job {} (interval: {:?})",
            job_id, self.config.interval
        );

        let (sender, _) = watch::channel(PollState::new(job_id));
        let state = Arc::new(sender);
        let callbacks = CallbackSlots::new(callbacks);

        let task = PollTask {
            job_id,
            api: Arc::clone(&self.api),
            config: self.config.clone(),
            state: Arc::clone(&state),
            callbacks: callbacks.clone(),
        };
        let join = tokio::spawn(task.run());

        PollHandle::new(
            job_id,
            Arc::clone(&self.api),
            self.config.clone(),
            state,
            callbacks,
            join,
        )
    }
}

/// The background loop of one poller
struct PollTask {
    job_id: JobId,
    api: Arc<dyn JobApi>,
    config: PollerConfig,
    state: Arc<watch::Sender<PollState>>,
    callbacks: CallbackSlots,
}

impl PollTask {
    async fn run(self) {
        let mut ticker = time::interval(self.config.interval);
        // A slow fetch pushes the next tick back instead of bunching ticks up
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut seq: u64 = 0;

        loop {
            // The first tick completes immediately
            ticker.tick().await;

            // Counting a poll is not worth waking subscribers for
            let mut started = false;
            self.state.send_if_modified(|s| {
                started = s.begin_poll();
                false
            });
            if !started {
                break;
            }

            seq += 1;
            debug!("Polling status of job {} (poll #{})", self.job_id, seq);

            let keep_polling = match self.api.get_job_status(self.job_id).await {
                Ok(status) => self.on_status(seq, status).await,
                Err(e) => self.on_fetch_error(seq, e.to_string(), !e.is_transient()),
            };

            if !keep_polling {
                break;
            }
        }

        debug!("Poll loop for job {} stopped", self.job_id);
    }

    /// Applies a fetched status. Returns whether polling continues.
    async fn on_status(&self, seq: u64, status: JobStatus) -> bool {
        if status.id != self.job_id {
            let message = format!(
                "status response is for job {} instead of job {}",
                status.id, self.job_id
            );
            return self.on_fetch_error(seq, message, true);
        }

        let job_state = status.status;
        let mut applied = Applied::Ignored;
        self.state.send_if_modified(|s| {
            applied = s.apply_status(seq, status);
            applied != Applied::Ignored
        });

        match applied {
            Applied::Ignored => {
                debug!("Discarding status of job {} (poll #{})", self.job_id, seq);
                self.is_active()
            }
            Applied::Updated => {
                if self.config.fetch_categories && job_state.produces_categories() {
                    self.refresh_categories().await;
                }
                true
            }
            Applied::Terminal(PollPhase::Completed) => {
                info!("Job {} completed", self.job_id);
                self.callbacks.fire_complete(self.job_id);
                false
            }
            Applied::Terminal(PollPhase::Failed) => {
                let message = self.state.borrow().error.clone().unwrap_or_default();
                warn!("Job {} failed: {}", self.job_id, message);
                self.callbacks.fire_failure(self.job_id, &message);
                false
            }
            Applied::Terminal(phase) => {
                info!("Job {} finished: {}", self.job_id, phase);
                false
            }
        }
    }

    /// Records a failed status fetch. Returns whether polling continues.
    fn on_fetch_error(&self, seq: u64, message: String, permanent: bool) -> bool {
        let give_up_after = self.config.give_up_after;
        let mut outcome = FetchFailure::Ignored;
        self.state.send_if_modified(|s| {
            outcome = s.record_fetch_error(seq, message.clone(), permanent, give_up_after);
            outcome != FetchFailure::Ignored
        });

        match outcome {
            FetchFailure::Recorded(failures) => {
                warn!(
                    "Failed to fetch status of job {} ({} in a row): {}",
                    self.job_id, failures, message
                );
                true
            }
            FetchFailure::GaveUp(failures) => {
                error!(
                    "Giving up on job {} after {} failed status fetches: {}",
                    self.job_id, failures, message
                );
                false
            }
            FetchFailure::Ignored => self.is_active(),
        }
    }

    /// Best-effort category refresh; failures are swallowed
    async fn refresh_categories(&self) {
        match self.api.get_job_categories(self.job_id).await {
            Ok(categories) => {
                self.state.send_if_modified(|s| s.apply_categories(categories));
            }
            Err(e) => {
                debug!(
                    "Ignoring category fetch failure for job {}: {}",
                    self.job_id, e
                );
            }
        }
    }

    fn is_active(&self) -> bool {
        self.state.borrow().is_active()
    }
}
