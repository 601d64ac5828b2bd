//! Completion and failure notifications
//!
//! Callbacks live in single-slot cells shared between the handle and the
//! poll task. The task reads the slot when it fires, so replacing a callback
//! through the handle takes effect without restarting the task. Firing takes
//! the callback out of its slot, which makes each notification at-most-once.

use std::sync::{Arc, Mutex, PoisonError};

use geo_core::JobId;

pub type CompletionCallback = Box<dyn FnOnce(JobId) + Send + 'static>;
pub type FailureCallback = Box<dyn FnOnce(JobId, &str) + Send + 'static>;

/// Notifications requested when starting a poller
#[derive(Default)]
pub struct Callbacks {
    on_complete: Option<CompletionCallback>,
    on_failure: Option<FailureCallback>,
}

impl Callbacks {
    /// No notifications; observe the state instead
    pub fn new() -> Self {
        Self::default()
    }

    /// Notify `f` once the job completes
    pub fn on_complete<F>(f: F) -> Self
    where
        F: FnOnce(JobId) + Send + 'static,
    {
        Self {
            on_complete: Some(Box::new(f)),
            on_failure: None,
        }
    }

    /// Also notify `f` with the job's message if it fails
    pub fn with_failure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(JobId, &str) + Send + 'static,
    {
        self.on_failure = Some(Box::new(f));
        self
    }
}

type Slot<T> = Arc<Mutex<Option<T>>>;

#[derive(Clone)]
pub(crate) struct CallbackSlots {
    complete: Slot<CompletionCallback>,
    failure: Slot<FailureCallback>,
}

impl CallbackSlots {
    pub(crate) fn new(callbacks: Callbacks) -> Self {
        Self {
            complete: Arc::new(Mutex::new(callbacks.on_complete)),
            failure: Arc::new(Mutex::new(callbacks.on_failure)),
        }
    }

    pub(crate) fn replace_complete(&self, f: CompletionCallback) {
        *lock(&self.complete) = Some(f);
    }

    pub(crate) fn replace_failure(&self, f: FailureCallback) {
        *lock(&self.failure) = Some(f);
    }

    /// Invokes the completion callback if one is still present
    pub(crate) fn fire_complete(&self, job_id: JobId) -> bool {
        // Release the lock before calling out
        let callback = lock(&self.complete).take();
        match callback {
            Some(f) => {
                f(job_id);
                true
            }
            None => false,
        }
    }

    /// Invokes the failure callback if one is still present
    pub(crate) fn fire_failure(&self, job_id: JobId, message: &str) -> bool {
        let callback = lock(&self.failure).take();
        match callback {
            Some(f) => {
                f(job_id, message);
                true
            }
            None => false,
        }
    }
}

fn lock<T>(slot: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
