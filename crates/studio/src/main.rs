//! `bukae-studio` -- submit a product video job and follow it to the end.
//!
//! Reads the edited scenes from a JSON file, creates an
//! `AUTO_CREATE_VIDEO_FROM_DATA` job for the product, and polls the
//! job-runner until the video is ready or the job fails. Ctrl-C stops
//! watching; the job itself keeps running.
//!
//! # Environment variables
//!
//! | Variable             | Required | Description                                       |
//! |----------------------|----------|---------------------------------------------------|
//! | `STUDIO_PRODUCT_ID`  | yes      | Product the video is about                        |
//! | `STUDIO_SCENES_FILE` | yes      | JSON array of `{imageUrl, editedScript, recommendedScript}` |
//!
//! Client settings (`STUDIO_API_URL`, polling, timeouts) are documented on
//! [`StudioConfig::from_env`].

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use bukae_core::job_request::JobKind;
use bukae_core::scene::Scene;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bukae_studio::api::StudioApi;
use bukae_studio::config::StudioConfig;
use bukae_studio::events::ObserverEvent;
use bukae_studio::observer::{JobObserver, ObservationOutcome};
use bukae_studio::runner::JobRunner;
use bukae_studio::submitter::{JobSubmitter, SubmitError};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bukae_studio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = ?e, "bukae-studio failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    let config = StudioConfig::from_env()?;
    let product_id = std::env::var("STUDIO_PRODUCT_ID").ok();
    let scenes_file =
        std::env::var("STUDIO_SCENES_FILE").context("STUDIO_SCENES_FILE must be set")?;
    let scenes = load_scenes(Path::new(&scenes_file))?;

    tracing::info!(
        api_url = %config.api_url,
        scenes = scenes.len(),
        "Starting bukae-studio",
    );

    let runner: Arc<dyn JobRunner> =
        Arc::new(StudioApi::with_timeout(&config.api_url, config.request_timeout)?);

    let submitter = JobSubmitter::new(Arc::clone(&runner));
    let submitted = match submitter
        .submit(&scenes, product_id.as_deref(), JobKind::default())
        .await
    {
        Ok(submitted) => submitted,
        Err(SubmitError::Validation(e)) => {
            tracing::error!(error = %e, "Job request rejected");
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e.into()),
    };

    let observer = JobObserver::new(runner, config.observer);
    let mut observation = observer.start_observing(submitted.job_id);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => observation.stop_observing(),
            event = observation.next_event() => match event {
                Some(event) => log_event(&event),
                None => break,
            },
        }
    }

    let report = observation.wait().await?;
    tracing::info!(
        job_id = %report.job_id,
        polls = report.polls,
        poll_errors = report.poll_errors,
        anomalies = report.anomalies,
        "Observation finished",
    );

    Ok(match report.outcome {
        ObservationOutcome::Completed { .. } => ExitCode::SUCCESS,
        ObservationOutcome::Abandoned => ExitCode::from(130),
        ObservationOutcome::Failed { .. } | ObservationOutcome::TimedOut => ExitCode::FAILURE,
    })
}

fn load_scenes(path: &Path) -> anyhow::Result<Vec<Scene>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenes from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse scenes in {}", path.display()))
}

fn log_event(event: &ObserverEvent) {
    match event {
        ObserverEvent::Snapshot(snapshot) => tracing::info!(
            status = %snapshot.status,
            progress = snapshot.progress,
            detail = snapshot.progress_detail.as_deref().unwrap_or(""),
            "{}% complete",
            snapshot.progress,
        ),
        ObserverEvent::PollFailed {
            consecutive,
            warning,
            error,
            ..
        } => {
            if *warning {
                tracing::warn!(consecutive, error = %error, "Job status unavailable");
            }
        }
        ObserverEvent::Anomaly(anomaly) => {
            tracing::warn!(anomaly = %anomaly, "Job-runner protocol anomaly")
        }
        ObserverEvent::Completed { job_id, result_ref } => tracing::info!(
            job_id = %job_id,
            result_ref = result_ref.as_deref().unwrap_or("<none>"),
            "Video ready",
        ),
        ObserverEvent::Failed { job_id, message } => {
            tracing::error!(job_id = %job_id, "Video generation failed: {message}")
        }
    }
}
