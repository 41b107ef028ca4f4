//! The job-runner collaborator.
//!
//! The runner owns every job record. This client only ever creates a
//! job and reads it back; it never mutates status and never cancels.

use async_trait::async_trait;
use bukae_core::job::Job;
use bukae_core::job_request::JobRequest;
use bukae_core::types::JobId;
use serde::Deserialize;

/// Response body of a successful job creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedJob {
    /// Identifier assigned by the runner.
    pub id: JobId,
}

/// Operations the client needs from the job-runner service.
#[async_trait]
pub trait JobRunner: Send + Sync {
    /// Create a job. Called exactly once per submission.
    async fn create_job(&self, request: &JobRequest) -> Result<CreatedJob, RunnerError>;

    /// Fetch the current state of a job.
    async fn get_job(&self, job_id: &str) -> Result<Job, RunnerError>;
}

/// Errors from talking to the job-runner.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The HTTP exchange failed after connecting (TLS, body, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The runner answered with a non-2xx status code.
    #[error("Job-runner API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The runner does not know the job id.
    #[error("Job {0} not found")]
    NotFound(JobId),

    /// The runner answered 2xx with a body that breaks the contract.
    #[error("Invalid job-runner response: {0}")]
    InvalidResponse(String),

    /// The runner could not be reached or did not answer in time.
    #[error("Job-runner unavailable: {0}")]
    Unavailable(String),

    /// The configured base URL cannot address a job.
    #[error("Invalid job-runner URL: {0}")]
    InvalidUrl(String),
}
