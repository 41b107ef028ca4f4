//! Job submission.
//!
//! [`JobSubmitter::submit`] validates the scenes locally and only then
//! issues a single creation call to the runner. It never retries; retry
//! is the caller's decision.

use std::sync::Arc;

use bukae_core::error::CoreError;
use bukae_core::job_request::{build_job_request, JobKind, JobRequest};
use bukae_core::scene::Scene;
use bukae_core::types::JobId;

use crate::runner::{JobRunner, RunnerError};

/// A job accepted by the runner.
#[derive(Debug, Clone)]
pub struct SubmittedJob {
    pub job_id: JobId,
    pub request: JobRequest,
}

/// Errors returned by [`JobSubmitter::submit`].
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The input was rejected before any network call.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// The creation call to the runner failed.
    #[error("Job submission failed: {0}")]
    Submission(#[source] RunnerError),
}

/// Creates render jobs on the job-runner.
pub struct JobSubmitter {
    runner: Arc<dyn JobRunner>,
}

impl JobSubmitter {
    pub fn new(runner: Arc<dyn JobRunner>) -> Self {
        Self { runner }
    }

    /// Validate `scenes` and create a job for `subject_id`.
    ///
    /// On validation failure the runner is not contacted at all.
    pub async fn submit(
        &self,
        scenes: &[Scene],
        subject_id: Option<&str>,
        job_kind: JobKind,
    ) -> Result<SubmittedJob, SubmitError> {
        let request = build_job_request(scenes, subject_id, job_kind).inspect_err(|e| {
            tracing::warn!(error = %e, "Rejected job request before submission");
        })?;

        let created = self.runner.create_job(&request).await.map_err(|e| {
            tracing::error!(
                product_id = %request.subject_id(),
                error = %e,
                "Failed to create studio job",
            );
            SubmitError::Submission(e)
        })?;

        tracing::info!(
            job_id = %created.id,
            product_id = %request.subject_id(),
            job_kind = request.job_kind().as_str(),
            scenes = request.scene_pairs().len(),
            "Studio job submitted",
        );

        Ok(SubmittedJob {
            job_id: created.id,
            request,
        })
    }
}
