//! Studio render-job client.
//!
//! Submits video-generation jobs to the studio job-runner and observes
//! them by polling until they complete or fail:
//!
//! - [`runner`]: the [`JobRunner`](runner::JobRunner) collaborator trait.
//! - [`api`]: HTTP implementation of the runner over `reqwest`.
//! - [`submitter`]: validates scenes and creates the job.
//! - [`observer`]: fixed-interval polling loop with explicit start/stop.
//! - [`events`]: what an observation reports back to its caller.
//! - [`config`]: environment-driven configuration.

pub mod api;
pub mod config;
pub mod events;
pub mod observer;
pub mod runner;
pub mod submitter;
