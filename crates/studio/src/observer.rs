//! Job observation by fixed-interval polling.
//!
//! [`JobObserver::start_observing`] spawns one task per job. The task
//! polls immediately, then waits `poll_interval` after each poll
//! resolves before polling again, so there is never more than one
//! request in flight for a job. It stops for good on the first terminal
//! status, on [`Observation::stop_observing`], when the handle is
//! dropped, or when the optional `max_wait` elapses.
//!
//! Stopping an observation only stops watching; the job keeps running
//! on the runner.

use std::sync::Arc;
use std::time::Duration;

use bukae_core::job::{Job, JobSnapshot};
use bukae_core::progress::ProgressMap;
use bukae_core::tracker::{JobTracker, ProtocolAnomaly, Step};
use bukae_core::types::JobId;
use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::events::ObserverEvent;
use crate::runner::JobRunner;

/// Delay between the end of one poll and the start of the next.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Consecutive poll failures after which a warning is raised.
pub const DEFAULT_POLL_WARNING_THRESHOLD: u32 = 3;

/// Buffered events per observation before the poll loop waits for the
/// caller to catch up.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Tunable parameters for an observation.
#[derive(Debug, Clone)]
pub struct ObserverConfig {
    pub poll_interval: Duration,
    pub poll_warning_threshold: u32,
    /// Give up watching after this long. `None` polls until terminal.
    pub max_wait: Option<Duration>,
    pub progress: ProgressMap,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_warning_threshold: DEFAULT_POLL_WARNING_THRESHOLD,
            max_wait: None,
            progress: ProgressMap::default(),
        }
    }
}

/// How an observation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservationOutcome {
    Completed { result_ref: Option<String> },
    Failed { message: String },
    /// The caller stopped watching.
    Abandoned,
    /// `max_wait` elapsed before a terminal status was seen.
    TimedOut,
}

/// Final summary of an observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationReport {
    pub job_id: JobId,
    pub outcome: ObservationOutcome,
    /// Poll requests issued, failed ones included.
    pub polls: u32,
    pub poll_errors: u32,
    pub anomalies: u32,
}

/// Starts observations against a job-runner.
pub struct JobObserver {
    runner: Arc<dyn JobRunner>,
    config: ObserverConfig,
}

impl JobObserver {
    pub fn new(runner: Arc<dyn JobRunner>, config: ObserverConfig) -> Self {
        Self { runner, config }
    }

    /// Begin watching `job_id`. Must be called inside a Tokio runtime.
    ///
    /// Each call gets its own task and handle; observations of different
    /// jobs share no state.
    pub fn start_observing(&self, job_id: impl Into<JobId>) -> Observation {
        let job_id = job_id.into();
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();

        let poller = Poller {
            runner: Arc::clone(&self.runner),
            config: self.config.clone(),
            tracker: JobTracker::new(job_id.clone()),
            events: event_tx,
            cancel: cancel.clone(),
            polls: 0,
            poll_errors: 0,
            consecutive_errors: 0,
        };
        let task = tokio::spawn(poller.run());

        Observation {
            job_id,
            events: event_rx,
            cancel: cancel.clone(),
            task,
            _guard: cancel.drop_guard(),
        }
    }
}

/// Handle to one running observation.
///
/// Dropping the handle stops the observation.
pub struct Observation {
    job_id: JobId,
    events: mpsc::Receiver<ObserverEvent>,
    cancel: CancellationToken,
    task: JoinHandle<ObservationReport>,
    _guard: DropGuard,
}

impl Observation {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Next event, or `None` once the observation has ended and all
    /// buffered events were consumed.
    pub async fn next_event(&mut self) -> Option<ObserverEvent> {
        self.events.recv().await
    }

    /// Stop watching. No poll is started after this returns; an
    /// in-flight poll is dropped. Calling it again, or after the
    /// observation finished, does nothing.
    pub fn stop_observing(&self) {
        if !self.cancel.is_cancelled() {
            tracing::info!(job_id = %self.job_id, "Stopping job observation");
            self.cancel.cancel();
        }
    }

    /// Wait for the observation to end, discarding unread events.
    pub async fn wait(mut self) -> Result<ObservationReport, JoinError> {
        while self.events.recv().await.is_some() {}
        (&mut self.task).await
    }
}

/// State owned by the polling task.
struct Poller {
    runner: Arc<dyn JobRunner>,
    config: ObserverConfig,
    tracker: JobTracker,
    events: mpsc::Sender<ObserverEvent>,
    cancel: CancellationToken,
    polls: u32,
    poll_errors: u32,
    consecutive_errors: u32,
}

impl Poller {
    async fn run(mut self) -> ObservationReport {
        let job_id = self.tracker.job_id().to_string();
        let deadline = self.config.max_wait.map(|d| Instant::now() + d);

        tracing::info!(
            job_id = %job_id,
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            max_wait_secs = self.config.max_wait.map(|d| d.as_secs()),
            "Job observation started",
        );

        let outcome = loop {
            if self.polls > 0 {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => break ObservationOutcome::Abandoned,
                    _ = wait_until(deadline) => break ObservationOutcome::TimedOut,
                    _ = tokio::time::sleep(self.config.poll_interval) => {}
                }
            }

            let polled = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break ObservationOutcome::Abandoned,
                _ = wait_until(deadline) => break ObservationOutcome::TimedOut,
                result = self.runner.get_job(&job_id) => result,
            };
            self.polls += 1;

            let job = match polled {
                Ok(job) => job,
                Err(e) => {
                    if !self.record_poll_error(&job_id, e.to_string()).await {
                        break ObservationOutcome::Abandoned;
                    }
                    continue;
                }
            };
            self.consecutive_errors = 0;

            match self.apply(job).await {
                Some(outcome) => break outcome,
                None if self.events.is_closed() => break ObservationOutcome::Abandoned,
                None => {}
            }
        };

        match &outcome {
            ObservationOutcome::Completed { .. } => {
                tracing::info!(job_id = %job_id, polls = self.polls, "Job completed");
            }
            ObservationOutcome::Failed { message } => {
                tracing::warn!(job_id = %job_id, polls = self.polls, error = %message, "Job failed");
            }
            ObservationOutcome::Abandoned => {
                tracing::info!(job_id = %job_id, polls = self.polls, "Job observation abandoned");
            }
            ObservationOutcome::TimedOut => {
                tracing::warn!(
                    job_id = %job_id,
                    polls = self.polls,
                    "Gave up waiting for job to reach a terminal status",
                );
            }
        }

        ObservationReport {
            job_id,
            outcome,
            polls: self.polls,
            poll_errors: self.poll_errors,
            anomalies: self.tracker.anomalies(),
        }
    }

    /// Feed one polled job through the tracker and emit its events.
    ///
    /// Returns the outcome when the job reached a terminal status.
    async fn apply(&mut self, job: Job) -> Option<ObservationOutcome> {
        if let Err(anomaly) = self.tracker.check_id(&job.id) {
            self.report_anomaly(anomaly).await;
            return None;
        }
        let advance = match self.tracker.advance(&job.status) {
            Ok(advance) => advance,
            Err(anomaly) => {
                // Closed tracker: the status is discarded unchanged.
                self.report_anomaly(anomaly).await;
                return None;
            }
        };
        if let Some(anomaly) = advance.anomaly {
            self.report_anomaly(anomaly).await;
        }

        let snapshot = JobSnapshot::from_job(&job, &self.config.progress, Utc::now());
        tracing::debug!(
            job_id = %snapshot.job_id,
            status = %snapshot.status,
            progress = snapshot.progress,
            detail = snapshot.progress_detail.as_deref().unwrap_or(""),
            "Job snapshot",
        );
        self.emit(ObserverEvent::Snapshot(snapshot)).await;

        match advance.step {
            Step::Continue => None,
            Step::Completed => {
                self.emit(ObserverEvent::Completed {
                    job_id: job.id.clone(),
                    result_ref: job.result_ref.clone(),
                })
                .await;
                Some(ObservationOutcome::Completed {
                    result_ref: job.result_ref,
                })
            }
            Step::Failed => {
                let message = job.failure_message();
                self.emit(ObserverEvent::Failed {
                    job_id: job.id,
                    message: message.clone(),
                })
                .await;
                Some(ObservationOutcome::Failed { message })
            }
        }
    }

    /// Count and report a failed poll. Returns `false` if the caller has
    /// gone away.
    async fn record_poll_error(&mut self, job_id: &str, error: String) -> bool {
        self.poll_errors += 1;
        self.consecutive_errors += 1;
        let warning = self.consecutive_errors >= self.config.poll_warning_threshold;

        if warning {
            tracing::warn!(
                job_id = %job_id,
                consecutive = self.consecutive_errors,
                error = %error,
                "Job status unavailable for several polls in a row",
            );
        } else {
            tracing::debug!(job_id = %job_id, error = %error, "Poll failed, will retry");
        }

        self.emit(ObserverEvent::PollFailed {
            job_id: job_id.to_string(),
            consecutive: self.consecutive_errors,
            warning,
            error,
        })
        .await
    }

    async fn report_anomaly(&self, anomaly: ProtocolAnomaly) {
        tracing::warn!(anomaly = %anomaly, "Job-runner protocol anomaly");
        self.emit(ObserverEvent::Anomaly(anomaly)).await;
    }

    /// Deliver an event unless the observation is being abandoned.
    /// Returns `false` if it could not be delivered.
    async fn emit(&self, event: ObserverEvent) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.events.send(event) => sent.is_ok(),
        }
    }
}

/// Resolves at `deadline`, or never when there is none.
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
