//! Job-related API endpoints

use async_trait::async_trait;
use geo_core::dto::job::CategoryList;
use geo_core::{Category, JobId, JobStatus};
use reqwest::Method;
use tracing::debug;

use crate::GeoClient;
use crate::api::JobApi;
use crate::error::Result;

impl GeoClient {
    // =============================================================================
    // Job Tracking
    // =============================================================================

    /// Get the current status of a job
    ///
    /// # Arguments
    /// * `job_id` - The job identifier
    ///
    /// # Returns
    /// The latest status snapshot reported by the backend
    pub async fn get_job_status(&self, job_id: JobId) -> Result<JobStatus> {
        debug!("Fetching status for job {}", job_id);
        let path = format!("/api/v1/jobs/{}/status", job_id);
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await
    }

    /// Get the categories a job has produced so far
    ///
    /// # Arguments
    /// * `job_id` - The job identifier
    ///
    /// # Returns
    /// The categories in display order (possibly empty)
    pub async fn get_job_categories(&self, job_id: JobId) -> Result<Vec<Category>> {
        debug!("Fetching categories for job {}", job_id);
        let path = format!("/api/v1/jobs/{}/categories", job_id);
        let response = self.request(Method::GET, &path).send().await?;

        let list: CategoryList = self.handle_response(response).await?;
        Ok(list.into_sorted())
    }

    /// Request cancellation of a job
    ///
    /// The backend only acknowledges the request; the job moving to
    /// `cancelled` is observed through its status.
    ///
    /// # Arguments
    /// * `job_id` - The job identifier
    pub async fn cancel_job(&self, job_id: JobId) -> Result<()> {
        debug!("Requesting cancellation of job {}", job_id);
        let path = format!("/api/v1/jobs/{}/cancel", job_id);
        let response = self.request(Method::POST, &path).send().await?;

        self.handle_empty_response(response).await
    }
}

#[async_trait]
impl JobApi for GeoClient {
    async fn get_job_status(&self, job_id: JobId) -> Result<JobStatus> {
        GeoClient::get_job_status(self, job_id).await
    }

    async fn get_job_categories(&self, job_id: JobId) -> Result<Vec<Category>> {
        GeoClient::get_job_categories(self, job_id).await
    }

    async fn cancel_job(&self, job_id: JobId) -> Result<()> {
        GeoClient::cancel_job(self, job_id).await
    }
}
