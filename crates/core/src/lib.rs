//! Domain logic for studio render jobs.
//!
//! Everything in this crate is pure: building and validating job
//! requests from scenes, the job status vocabulary, the status to
//! progress mapping, and the lifecycle tracker that decides when an
//! observation is finished. Network access lives in `bukae-studio`.

pub mod error;
pub mod job;
pub mod job_request;
pub mod job_status;
pub mod progress;
pub mod scene;
pub mod tracker;
pub mod types;
