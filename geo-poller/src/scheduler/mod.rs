//! Scheduler layer
//!
//! Owns the timer-driven poll loops. [`JobPoller`] starts them and
//! [`PollHandle`] is how a caller observes, cancels or tears one down.

mod handle;
pub mod poller;


pub use handle::PollHandle;
pub use poller::JobPoller;
