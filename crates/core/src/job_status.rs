//! Job status vocabulary reported by the job-runner.
//!
//! The runner reports status as one of exactly `PENDING`, `PROCESSING`,
//! `COMPLETED` or `FAILED`. Anything else is kept verbatim as
//! [`ReportedStatus::Unrecognized`] so that a new runner status never
//! turns into a decode error on the client.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire name for a job waiting to be picked up by a render worker.
pub const STATUS_PENDING: &str = "PENDING";
/// Wire name for a job being rendered.
pub const STATUS_PROCESSING: &str = "PROCESSING";
/// Wire name for a job that produced its video.
pub const STATUS_COMPLETED: &str = "COMPLETED";
/// Wire name for a job that the runner gave up on.
pub const STATUS_FAILED: &str = "FAILED";

/// A status from the known runner vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Every known status, in lifecycle order.
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Pending,
        JobStatus::Processing,
        JobStatus::Completed,
        JobStatus::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => STATUS_PENDING,
            JobStatus::Processing => STATUS_PROCESSING,
            JobStatus::Completed => STATUS_COMPLETED,
            JobStatus::Failed => STATUS_FAILED,
        }
    }

    /// Parse an exact wire name. Matching is case-sensitive.
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// `COMPLETED` and `FAILED` admit no further transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Position in the lifecycle; a lower stage after a higher one is a
    /// regression.
    pub(crate) fn stage(self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Processing => 1,
            JobStatus::Completed | JobStatus::Failed => 2,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status exactly as observed on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReportedStatus {
    Known(JobStatus),
    Unrecognized(String),
}

impl ReportedStatus {
    /// The known status, if this is one.
    pub fn known(&self) -> Option<JobStatus> {
        match self {
            ReportedStatus::Known(status) => Some(*status),
            ReportedStatus::Unrecognized(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.known().is_some_and(JobStatus::is_terminal)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ReportedStatus::Known(status) => status.as_str(),
            ReportedStatus::Unrecognized(raw) => raw,
        }
    }
}

impl From<JobStatus> for ReportedStatus {
    fn from(status: JobStatus) -> Self {
        ReportedStatus::Known(status)
    }
}

impl From<String> for ReportedStatus {
    fn from(value: String) -> Self {
        match JobStatus::from_wire(&value) {
            Some(status) => ReportedStatus::Known(status),
            None => ReportedStatus::Unrecognized(value),
        }
    }
}

impl From<&str> for ReportedStatus {
    fn from(value: &str) -> Self {
        ReportedStatus::from(value.to_string())
    }
}

impl From<ReportedStatus> for String {
    fn from(status: ReportedStatus) -> Self {
        match status {
            ReportedStatus::Known(status) => status.as_str().to_string(),
            ReportedStatus::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for ReportedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for status in JobStatus::ALL {
            assert_eq!(JobStatus::from_wire(status.as_str()), Some(status));
        }
    }

    #[test]
    fn only_completed_and_failed_are_terminal() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(JobStatus::from_wire("pending"), None);
        assert_eq!(
            ReportedStatus::from("completed"),
            ReportedStatus::Unrecognized("completed".into())
        );
    }

    #[test]
    fn unknown_status_deserializes_without_error() {
        let status: ReportedStatus = serde_json::from_str(r#""QUEUED_REMOTE""#).unwrap();
        assert_eq!(status, ReportedStatus::Unrecognized("QUEUED_REMOTE".into()));
        assert!(!status.is_terminal());
        assert_eq!(status.known(), None);
    }

    #[test]
    fn known_status_serializes_to_wire_name() {
        let json = serde_json::to_string(&ReportedStatus::from(JobStatus::Processing)).unwrap();
        assert_eq!(json, r#""PROCESSING""#);
    }
}
