//! Job request construction and validation.
//!
//! [`build_job_request`] turns the editor's ordered scenes into the
//! job-runner's input contract. All checks happen here, before any
//! network call is attempted, so a rejected request never results in a
//! partial submission.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::scene::{Scene, ScenePair};

// ---------------------------------------------------------------------------
// Job kinds
// ---------------------------------------------------------------------------

/// Render pipeline variant requested from the job-runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobKind {
    /// Assemble a product video from (image, script) pairs.
    #[default]
    AutoCreateVideoFromData,
}

impl JobKind {
    /// Wire name of the job kind.
    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::AutoCreateVideoFromData => "AUTO_CREATE_VIDEO_FROM_DATA",
        }
    }
}

// ---------------------------------------------------------------------------
// JobRequest
// ---------------------------------------------------------------------------

/// Immutable creation request sent to the job-runner.
///
/// Only obtainable through [`build_job_request`], so every instance has
/// a non-blank subject and at least one complete scene pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRequest {
    #[serde(rename = "productId")]
    subject_id: String,
    #[serde(rename = "jobType")]
    job_kind: JobKind,
    #[serde(rename = "imageScriptPairs")]
    scene_pairs: Vec<ScenePair>,
}

impl JobRequest {
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn job_kind(&self) -> JobKind {
        self.job_kind
    }

    /// Scene pairs in video order.
    pub fn scene_pairs(&self) -> &[ScenePair] {
        &self.scene_pairs
    }
}

/// Build a [`JobRequest`] from ordered scenes.
///
/// Fails with [`CoreError::Validation`] when the subject is missing or
/// blank, when `scenes` is empty, or when any scene lacks an image URL
/// or a usable script. The error names the first offending scene by its
/// zero-based index.
pub fn build_job_request(
    scenes: &[Scene],
    subject_id: Option<&str>,
    job_kind: JobKind,
) -> Result<JobRequest, CoreError> {
    let subject_id = subject_id
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CoreError::Validation("A product id is required".into()))?;

    if scenes.is_empty() {
        return Err(CoreError::Validation(
            "At least one scene with an image and a script is required".into(),
        ));
    }

    let scene_pairs = scenes
        .iter()
        .enumerate()
        .map(|(index, scene)| resolve_pair(index, scene))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(JobRequest {
        subject_id: subject_id.to_string(),
        job_kind,
        scene_pairs,
    })
}

fn resolve_pair(index: usize, scene: &Scene) -> Result<ScenePair, CoreError> {
    if scene.image_url.trim().is_empty() {
        return Err(CoreError::Validation(format!("Scene {index} has no image URL")));
    }
    let script = scene.resolved_script().ok_or_else(|| {
        CoreError::Validation(format!(
            "Scene {index} has neither an edited nor a recommended script"
        ))
    })?;

    Ok(ScenePair {
        image_url: scene.image_url.clone(),
        script: script.to_string(),
    })
}
