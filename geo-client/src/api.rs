//! Job tracking trait
//!
//! The operations a job poller needs from the backend. [`GeoClient`](crate::GeoClient)
//! implements it over HTTP; tests implement it with scripted responses.

use async_trait::async_trait;
use geo_core::{Category, JobId, JobStatus};

use crate::error::Result;

/// Backend operations consumed while tracking a job
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Fetches the latest status snapshot of a job
    async fn get_job_status(&self, job_id: JobId) -> Result<JobStatus>;

    /// Fetches the categories a job has produced so far
    async fn get_job_categories(&self, job_id: JobId) -> Result<Vec<Category>>;

    /// Asks the backend to cancel a job
    ///
    /// Success means the request was accepted, not that the job stopped.
    async fn cancel_job(&self, job_id: JobId) -> Result<()>;
}
