//! Client-side lifecycle tracker for a single job.
//!
//! [`JobTracker`] consumes statuses in the order they were polled and
//! decides whether observation continues or has reached a terminal
//! outcome. Valid transitions:
//!
//! ```text
//! PENDING -> PROCESSING -> COMPLETED | FAILED
//! PENDING -> COMPLETED | FAILED
//! ```
//!
//! Once terminal, the tracker is closed: further statuses are rejected
//! with [`ProtocolAnomaly::AfterTerminal`] and leave it unchanged.

use crate::job_status::{JobStatus, ReportedStatus};
use crate::types::JobId;

/// What the observer should do after a status has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Non-terminal; keep polling.
    Continue,
    /// The job reached `COMPLETED`.
    Completed,
    /// The job reached `FAILED`.
    Failed,
}

/// Runner behaviour that breaks the status protocol.
///
/// Anomalies are logged and counted but never fatal to an observation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolAnomaly {
    #[error("Job {job_id} reported unrecognized status '{status}'")]
    UnrecognizedStatus { job_id: JobId, status: String },

    #[error("Job {job_id} moved backwards from {from} to {to}")]
    StatusRegression {
        job_id: JobId,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("Polling job {job_id} returned the record of job {reported_id}")]
    ForeignRecord { job_id: JobId, reported_id: JobId },

    #[error("Job {job_id} reported '{reported}' after terminal status {terminal}")]
    AfterTerminal {
        job_id: JobId,
        terminal: JobStatus,
        reported: String,
    },
}

/// Result of applying an accepted status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    pub step: Step,
    /// Set when the status was accepted but is suspicious.
    pub anomaly: Option<ProtocolAnomaly>,
}

/// Lifecycle state machine for one job id.
#[derive(Debug, Clone)]
pub struct JobTracker {
    job_id: JobId,
    last_known: Option<JobStatus>,
    anomalies: u32,
}

impl JobTracker {
    pub fn new(job_id: impl Into<JobId>) -> Self {
        Self {
            job_id: job_id.into(),
            last_known: None,
            anomalies: 0,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Most recent known status accepted by the tracker.
    pub fn last_known(&self) -> Option<JobStatus> {
        self.last_known
    }

    /// The terminal status, once one has been accepted.
    pub fn terminal(&self) -> Option<JobStatus> {
        self.last_known.filter(|s| s.is_terminal())
    }

    pub fn is_closed(&self) -> bool {
        self.terminal().is_some()
    }

    /// Number of anomalies seen so far, rejected statuses included.
    pub fn anomalies(&self) -> u32 {
        self.anomalies
    }

    /// Check that a polled record belongs to this job. A mismatch is
    /// counted and the record must be discarded.
    pub fn check_id(&mut self, reported_id: &str) -> Result<(), ProtocolAnomaly> {
        if reported_id == self.job_id {
            return Ok(());
        }
        self.anomalies += 1;
        Err(ProtocolAnomaly::ForeignRecord {
            job_id: self.job_id.clone(),
            reported_id: reported_id.to_string(),
        })
    }

    /// Apply the next polled status.
    ///
    /// Returns `Err` only when the tracker is already closed; the status
    /// is then discarded. Unrecognized statuses and regressions are
    /// accepted with an anomaly attached.
    pub fn advance(&mut self, status: &ReportedStatus) -> Result<Advance, ProtocolAnomaly> {
        if let Some(terminal) = self.terminal() {
            self.anomalies += 1;
            return Err(ProtocolAnomaly::AfterTerminal {
                job_id: self.job_id.clone(),
                terminal,
                reported: status.as_str().to_string(),
            });
        }

        let Some(next) = status.known() else {
            self.anomalies += 1;
            return Ok(Advance {
                step: Step::Continue,
                anomaly: Some(ProtocolAnomaly::UnrecognizedStatus {
                    job_id: self.job_id.clone(),
                    status: status.as_str().to_string(),
                }),
            });
        };

        let anomaly = match self.last_known {
            Some(prev) if next.stage() < prev.stage() => {
                self.anomalies += 1;
                Some(ProtocolAnomaly::StatusRegression {
                    job_id: self.job_id.clone(),
                    from: prev,
                    to: next,
                })
            }
            _ => None,
        };
        self.last_known = Some(next);

        let step = match next {
            JobStatus::Pending | JobStatus::Processing => Step::Continue,
            JobStatus::Completed => Step::Completed,
            JobStatus::Failed => Step::Failed,
        };
        Ok(Advance { step, anomaly })
    }
}
