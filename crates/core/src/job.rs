//! Job records as returned by the job-runner, and the snapshots the
//! client derives from them.

use serde::{Deserialize, Serialize};

use crate::job_status::ReportedStatus;
use crate::progress::ProgressMap;
use crate::types::{JobId, Timestamp};

/// Shown when the runner fails a job without saying why.
pub const GENERIC_FAILURE_MESSAGE: &str = "unknown error";

/// A job record as returned by `GET /studio/jobs/{id}`.
///
/// Owned and mutated exclusively by the job-runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub status: ReportedStatus,
    #[serde(default)]
    pub progress_detail: Option<String>,
    /// Only meaningful when the status is `FAILED`.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Reference to the produced video; only meaningful when `COMPLETED`.
    #[serde(default)]
    pub result_ref: Option<String>,
}

impl Job {
    /// The runner's failure reason, or [`GENERIC_FAILURE_MESSAGE`] when
    /// it is missing or blank.
    pub fn failure_message(&self) -> String {
        self.error_message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(GENERIC_FAILURE_MESSAGE)
            .to_string()
    }
}

/// Point-in-time view of a job produced by one poll.
///
/// Each snapshot replaces the previous one in full; fields are never
/// merged across snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub job_id: JobId,
    pub status: ReportedStatus,
    /// Percentage derived from `status` alone.
    pub progress: u8,
    pub progress_detail: Option<String>,
    pub observed_at: Timestamp,
}

impl JobSnapshot {
    pub fn from_job(job: &Job, progress: &ProgressMap, observed_at: Timestamp) -> Self {
        Self {
            job_id: job.id.clone(),
            status: job.status.clone(),
            progress: progress.for_reported(&job.status),
            progress_detail: job.progress_detail.clone(),
            observed_at,
        }
    }
}
