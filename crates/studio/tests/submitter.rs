//! Integration tests for job submission.

mod common;

use assert_matches::assert_matches;
use bukae_core::error::CoreError;
use bukae_core::job_request::JobKind;
use bukae_core::scene::Scene;
use bukae_studio::observer::{JobObserver, ObservationOutcome};
use bukae_studio::runner::RunnerError;
use bukae_studio::submitter::{JobSubmitter, SubmitError};

use common::*;

#[tokio::test]
async fn valid_scenes_create_exactly_one_job() {
    let runner = ScriptedRunner::new().creating("job1").into_arc();
    let submitter = JobSubmitter::new(runner.clone());

    let scenes = vec![
        Scene::new("a.jpg", "first"),
        Scene::new("b.jpg", "second").with_edited_script("second, edited"),
        Scene::new("c.jpg", "third"),
    ];
    let submitted = submitter
        .submit(&scenes, Some("product-7"), JobKind::AutoCreateVideoFromData)
        .await
        .unwrap();

    assert_eq!(submitted.job_id, "job1");
    assert_eq!(runner.creates(), 1);

    let sent = &runner.created_requests()[0];
    assert_eq!(sent.subject_id(), "product-7");
    let scripts: Vec<&str> = sent.scene_pairs().iter().map(|p| p.script.as_str()).collect();
    assert_eq!(scripts, vec!["first", "second, edited", "third"]);
    assert_eq!(submitted.request, *sent);
}

#[tokio::test]
async fn empty_scenes_never_reach_the_runner() {
    let runner = ScriptedRunner::new().creating("job1").into_arc();
    let submitter = JobSubmitter::new(runner.clone());

    let result = submitter.submit(&[], Some("product-7"), JobKind::default()).await;

    assert_matches!(result, Err(SubmitError::Validation(CoreError::Validation(_))));
    assert_eq!(runner.creates(), 0);
}

#[tokio::test]
async fn incomplete_scene_or_missing_product_never_reach_the_runner() {
    let runner = ScriptedRunner::new().creating("job1").into_arc();
    let submitter = JobSubmitter::new(runner.clone());

    let no_script = vec![Scene {
        image_url: "a.jpg".into(),
        ..Scene::default()
    }];
    assert_matches!(
        submitter.submit(&no_script, Some("p"), JobKind::default()).await,
        Err(SubmitError::Validation(_))
    );

    let scenes = vec![Scene::new("a.jpg", "hello")];
    assert_matches!(
        submitter.submit(&scenes, None, JobKind::default()).await,
        Err(SubmitError::Validation(_))
    );

    assert_eq!(runner.creates(), 0);
}

#[tokio::test]
async fn runner_failure_is_wrapped_and_not_retried() {
    let runner = ScriptedRunner::new().failing_create("connection reset").into_arc();
    let submitter = JobSubmitter::new(runner.clone());

    let scenes = vec![Scene::new("a.jpg", "hello")];
    let result = submitter.submit(&scenes, Some("p"), JobKind::default()).await;

    assert_matches!(
        result,
        Err(SubmitError::Submission(RunnerError::Unavailable(msg))) if msg == "connection reset"
    );
    assert_eq!(runner.creates(), 1);
}

// ---------------------------------------------------------------------------
// Test: submit, then observe the created job to completion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submitted_job_is_observed_to_completion() {
    let runner = ScriptedRunner::new()
        .creating("job1")
        .with_job(
            "job1",
            vec![
                pending("job1"),
                processing("job1"),
                processing("job1"),
                completed("job1", "videos/job1.mp4"),
            ],
        )
        .into_arc();

    let submitted = JobSubmitter::new(runner.clone())
        .submit(&[Scene::new("a.jpg", "hello")], Some("p"), JobKind::default())
        .await
        .unwrap();
    let pair = &submitted.request.scene_pairs()[0];
    assert_eq!((pair.image_url.as_str(), pair.script.as_str()), ("a.jpg", "hello"));

    let observer = JobObserver::new(runner.clone(), test_config());
    let (events, report) = run_to_end(observer.start_observing(submitted.job_id)).await;

    assert_eq!(progress_of(&events), vec![10, 50, 50, 100]);
    assert_matches!(report.outcome, ObservationOutcome::Completed { result_ref: Some(_) });
    assert_eq!(runner.gets("job1"), 4);
}
