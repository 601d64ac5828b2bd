//! Poll handle
//!
//! What the caller holds while a job is being tracked. Dropping the handle
//! tears the poller down.

use std::sync::Arc;

use geo_client::JobApi;
use geo_core::JobId;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::callbacks::CallbackSlots;
use crate::config::PollerConfig;
use crate::error::{PollerError, Result};
use crate::state::PollState;

/// Handle to a running poller
pub struct PollHandle {
    job_id: JobId,
    api: Arc<dyn JobApi>,
    config: PollerConfig,
    state: Arc<watch::Sender<PollState>>,
    callbacks: CallbackSlots,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub(crate) fn new(
        job_id: JobId,
        api: Arc<dyn JobApi>,
        config: PollerConfig,
        state: Arc<watch::Sender<PollState>>,
        callbacks: CallbackSlots,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            job_id,
            api,
            config,
            state,
            callbacks,
            task,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Latest state
    pub fn state(&self) -> PollState {
        self.state.borrow().clone()
    }

    /// Whether the poller is still polling
    pub fn is_active(&self) -> bool {
        self.state.borrow().is_active()
    }

    /// Receiver notified on every state change
    ///
    /// The current state counts as unseen, so the first `changed()` resolves
    /// right away even if the poller already stopped.
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        let mut receiver = self.state.subscribe();
        receiver.mark_changed();
        receiver
    }

    /// Waits until the poller stops for any reason and returns its final state
    pub async fn wait(&self) -> PollState {
        let mut receiver = self.state.subscribe();
        match receiver.wait_for(|s| !s.is_active()).await {
            Ok(state) => state.clone(),
            // The sender lives in this handle, so this is unreachable in practice
            Err(_) => self.state(),
        }
    }

    /// Replaces the completion callback without restarting the poller
    pub fn set_on_complete<F>(&self, f: F)
    where
        F: FnOnce(JobId) + Send + 'static,
    {
        self.callbacks.replace_complete(Box::new(f));
    }

    /// Replaces the failure callback without restarting the poller
    pub fn set_on_failure<F>(&self, f: F)
    where
        F: FnOnce(JobId, &str) + Send + 'static,
    {
        self.callbacks.replace_failure(Box::new(f));
    }

    /// Clears the fetch warning until the next failed fetch
    pub fn dismiss_fetch_error(&self) {
        self.state.send_if_modified(PollState::dismiss_fetch_error);
    }

    /// Clears the cancel warning
    pub fn dismiss_cancel_error(&self) {
        self.state.send_if_modified(PollState::dismiss_cancel_error);
    }

    /// Asks the backend to cancel the job
    ///
    /// On success local polling stops, unless the poller was configured to
    /// wait for the backend to confirm the cancellation. On failure the
    /// error is recorded in [`PollState::cancel_error`], polling carries on
    /// and the call may be retried.
    pub async fn cancel(&self) -> Result<()> {
        let phase = self.state.borrow().phase;
        if phase.is_terminal() {
            return Err(PollerError::NotActive {
                job_id: self.job_id,
                phase,
            });
        }

        info!("Requesting cancellation of job {}", self.job_id);

        match self.api.cancel_job(self.job_id).await {
            Ok(()) => {
                let stop = !self.config.await_cancel_confirmation;
                let accepted = self.state.send_if_modified(|s| s.cancel_accepted(stop));
                if accepted && stop {
                    self.task.abort();
                    info!("Stopped polling job {} after cancel request", self.job_id);
                }
                Ok(())
            }
            Err(e) => {
                warn!("Failed to cancel job {}: {}", self.job_id, e);
                let message = e.to_string();
                self.state
                    .send_if_modified(|s| s.record_cancel_error(message));
                Err(PollerError::Cancel {
                    job_id: self.job_id,
                    source: e,
                })
            }
        }
    }

    /// Stops polling and discards anything still in flight
    ///
    /// Takes effect immediately: the state is frozen before this returns,
    /// even if a status fetch is still pending.
    pub fn dispose(&self) {
        if self.state.send_if_modified(PollState::dispose) {
            debug!("Disposed poller for job {}", self.job_id);
        }
        self.task.abort();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for PollHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollHandle")
            .field("job_id", &self.job_id)
            .field("phase", &self.state.borrow().phase)
            .finish()
    }
}
