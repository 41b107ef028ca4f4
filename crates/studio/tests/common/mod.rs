#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bukae_core::job::Job;
use bukae_core::job_request::JobRequest;
use bukae_core::job_status::{JobStatus, ReportedStatus};
use bukae_studio::events::ObserverEvent;
use bukae_studio::observer::{Observation, ObservationReport, ObserverConfig};
use bukae_studio::runner::{CreatedJob, JobRunner, RunnerError};

/// Poll interval used by tests so scenarios finish in milliseconds.
pub const TEST_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub fn test_config() -> ObserverConfig {
    ObserverConfig {
        poll_interval: TEST_POLL_INTERVAL,
        ..ObserverConfig::default()
    }
}

/// One scripted answer to `get_job`.
#[derive(Debug, Clone)]
pub enum Reply {
    Job(Job),
    Error(String),
}

pub fn job(id: &str, status: impl Into<ReportedStatus>) -> Job {
    Job {
        id: id.to_string(),
        status: status.into(),
        progress_detail: None,
        error_message: None,
        result_ref: None,
    }
}

pub fn pending(id: &str) -> Reply {
    Reply::Job(job(id, JobStatus::Pending))
}

pub fn processing(id: &str) -> Reply {
    Reply::Job(job(id, JobStatus::Processing))
}

pub fn processing_with_detail(id: &str, detail: &str) -> Reply {
    Reply::Job(Job {
        progress_detail: Some(detail.to_string()),
        ..job(id, JobStatus::Processing)
    })
}

pub fn completed(id: &str, result_ref: &str) -> Reply {
    Reply::Job(Job {
        result_ref: Some(result_ref.to_string()),
        ..job(id, JobStatus::Completed)
    })
}

pub fn failed(id: &str, message: Option<&str>) -> Reply {
    Reply::Job(Job {
        error_message: message.map(str::to_string),
        ..job(id, JobStatus::Failed)
    })
}

pub fn unreachable_runner() -> Reply {
    Reply::Error("connection refused".to_string())
}

#[derive(Default)]
struct JobScript {
    replies: VecDeque<Reply>,
    last: Option<Reply>,
    gets: u32,
}

/// In-memory job-runner that answers polls from a per-job script.
///
/// Once a script runs out, the last reply is repeated, which models a
/// job stuck in its current status.
#[derive(Default)]
pub struct ScriptedRunner {
    scripts: Mutex<HashMap<String, JobScript>>,
    create_result: Mutex<Option<Result<String, String>>>,
    created: Mutex<Vec<JobRequest>>,
    poll_delay: Option<Duration>,
    in_flight: AtomicU32,
    max_in_flight: AtomicU32,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_job(self, job_id: &str, replies: Vec<Reply>) -> Self {
        self.scripts.lock().unwrap().insert(
            job_id.to_string(),
            JobScript {
                replies: replies.into(),
                ..JobScript::default()
            },
        );
        self
    }

    /// `create_job` answers with this id.
    pub fn creating(self, job_id: &str) -> Self {
        *self.create_result.lock().unwrap() = Some(Ok(job_id.to_string()));
        self
    }

    /// `create_job` fails with this message.
    pub fn failing_create(self, message: &str) -> Self {
        *self.create_result.lock().unwrap() = Some(Err(message.to_string()));
        self
    }

    /// Every poll takes this long to answer.
    pub fn with_poll_delay(mut self, delay: Duration) -> Self {
        self.poll_delay = Some(delay);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn gets(&self, job_id: &str) -> u32 {
        self.scripts
            .lock()
            .unwrap()
            .get(job_id)
            .map_or(0, |s| s.gets)
    }

    pub fn creates(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn created_requests(&self) -> Vec<JobRequest> {
        self.created.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> u32 {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self, job_id: &str) -> Option<Reply> {
        let mut scripts = self.scripts.lock().unwrap();
        let script = scripts.get_mut(job_id)?;
        script.gets += 1;
        if let Some(reply) = script.replies.pop_front() {
            script.last = Some(reply);
        }
        script.last.clone()
    }
}

#[async_trait]
impl JobRunner for ScriptedRunner {
    async fn create_job(&self, request: &JobRequest) -> Result<CreatedJob, RunnerError> {
        self.created.lock().unwrap().push(request.clone());
        match self.create_result.lock().unwrap().clone() {
            Some(Ok(id)) => Ok(CreatedJob { id }),
            Some(Err(message)) => Err(RunnerError::Unavailable(message)),
            None => Err(RunnerError::Api {
                status: 500,
                body: "no create result scripted".into(),
            }),
        }
    }

    async fn get_job(&self, job_id: &str) -> Result<Job, RunnerError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let reply = self.next_reply(job_id);
        if let Some(delay) = self.poll_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match reply {
            Some(Reply::Job(job)) => Ok(job),
            Some(Reply::Error(message)) => Err(RunnerError::Unavailable(message)),
            None => Err(RunnerError::NotFound(job_id.to_string())),
        }
    }
}

/// Read every event until the observation closes, then return them
/// with the final report.
pub async fn run_to_end(mut observation: Observation) -> (Vec<ObserverEvent>, ObservationReport) {
    let mut events = Vec::new();
    while let Some(event) = observation.next_event().await {
        events.push(event);
    }
    let report = observation.wait().await.expect("observer task panicked");
    (events, report)
}

/// Progress values of every snapshot, in order.
pub fn progress_of(events: &[ObserverEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            ObserverEvent::Snapshot(s) => Some(s.progress),
            _ => None,
        })
        .collect()
}
