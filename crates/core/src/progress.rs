//! Status to progress mapping.
//!
//! The runner reports no numeric progress, so the client shows a coarse
//! percentage looked up from the status alone. Elapsed time never feeds
//! into it.

use crate::error::CoreError;
use crate::job_status::{JobStatus, ReportedStatus};

pub const DEFAULT_PENDING_PROGRESS: u8 = 10;
pub const DEFAULT_PROCESSING_PROGRESS: u8 = 50;
pub const DEFAULT_COMPLETED_PROGRESS: u8 = 100;
pub const DEFAULT_FAILED_PROGRESS: u8 = 0;

/// Progress shown for a status outside the known vocabulary.
pub const UNRECOGNIZED_PROGRESS: u8 = 0;

/// Lookup table from known status to percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressMap {
    table: [u8; 4],
}

impl Default for ProgressMap {
    fn default() -> Self {
        Self {
            table: [
                DEFAULT_PENDING_PROGRESS,
                DEFAULT_PROCESSING_PROGRESS,
                DEFAULT_COMPLETED_PROGRESS,
                DEFAULT_FAILED_PROGRESS,
            ],
        }
    }
}

impl ProgressMap {
    /// Build a custom map.
    ///
    /// Every value must be at most 100, and the success path must not go
    /// backwards (`pending <= processing <= completed`).
    pub fn new(pending: u8, processing: u8, completed: u8, failed: u8) -> Result<Self, CoreError> {
        if [pending, processing, completed, failed].iter().any(|&p| p > 100) {
            return Err(CoreError::Validation(
                "Progress values must be between 0 and 100".into(),
            ));
        }
        if pending > processing || processing > completed {
            return Err(CoreError::Validation(format!(
                "Progress must not decrease along PENDING -> PROCESSING -> COMPLETED \
                 (got {pending} -> {processing} -> {completed})"
            )));
        }
        Ok(Self {
            table: [pending, processing, completed, failed],
        })
    }

    /// Percentage for a known status.
    pub fn percent(&self, status: JobStatus) -> u8 {
        self.table[slot(status)]
    }

    /// Percentage for a status as reported; unrecognized values map to
    /// [`UNRECOGNIZED_PROGRESS`].
    pub fn for_reported(&self, status: &ReportedStatus) -> u8 {
        status
            .known()
            .map_or(UNRECOGNIZED_PROGRESS, |s| self.percent(s))
    }
}

fn slot(status: JobStatus) -> usize {
    match status {
        JobStatus::Pending => 0,
        JobStatus::Processing => 1,
        JobStatus::Completed => 2,
        JobStatus::Failed => 3,
    }
}

/// Percentage for a reported status under the default map.
pub fn status_progress(status: &ReportedStatus) -> u8 {
    ProgressMap::default().for_reported(status)
}
