//! Events emitted by a running observation.
//!
//! Every successful poll produces a [`ObserverEvent::Snapshot`], even
//! when progress did not change, because the runner's progress detail
//! may have. A terminal poll is followed by exactly one
//! [`ObserverEvent::Completed`] or [`ObserverEvent::Failed`], after
//! which the stream closes.

use bukae_core::job::JobSnapshot;
use bukae_core::tracker::ProtocolAnomaly;
use bukae_core::types::JobId;

/// Something the caller of an observation may want to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverEvent {
    /// The latest view of the job. Replaces any earlier snapshot.
    Snapshot(JobSnapshot),

    /// One poll could not reach the runner. Polling continues.
    PollFailed {
        job_id: JobId,
        /// Failed polls in a row, this one included.
        consecutive: u32,
        /// Set once `consecutive` reaches the configured threshold.
        warning: bool,
        error: String,
    },

    /// The runner broke the status protocol. Polling continues.
    Anomaly(ProtocolAnomaly),

    /// The job finished successfully.
    Completed {
        job_id: JobId,
        result_ref: Option<String>,
    },

    /// The runner reported the job as failed.
    Failed { job_id: JobId, message: String },
}
