//! GEO Sensor Job Poller
//!
//! Tracks long-running analysis jobs by polling their status until they
//! complete, fail or are cancelled.
//!
//! Architecture:
//! - Configuration: interval and retry tunables ([`PollerConfig`])
//! - State: the snapshot exposed to the presentation layer ([`PollState`])
//! - Scheduler: one tokio task per tracked job ([`JobPoller`], [`PollHandle`])
//!
//! Guarantees:
//! - The first status fetch happens immediately, later ones once per interval.
//! - Nothing is fetched after the job reaches a terminal state.
//! - The completion callback fires at most once.
//! - After [`PollHandle::dispose`] (or drop), no response changes the state.
//! - Transient fetch errors are recorded and polling continues.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use geo_client::GeoClient;
//! use geo_poller::{Callbacks, JobPoller, PollerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(GeoClient::new("http://localhost:8000"));
//! let poller = JobPoller::new(api, PollerConfig::default())?;
//!
//! let handle = poller.start(42, Callbacks::on_complete(|id| println!("job {id} done")))?;
//! let final_state = handle.wait().await;
//! println!("stopped: {}", final_state.phase);
//! # Ok(())
//! # }
//! ```

mod callbacks;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod state;

pub use callbacks::{Callbacks, CompletionCallback, FailureCallback};
pub use config::PollerConfig;
pub use error::{PollerError, Result};
pub use scheduler::{JobPoller, PollHandle};
pub use state::{PollPhase, PollState};
