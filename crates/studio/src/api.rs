//! REST client for the studio job-runner.
//!
//! Wraps the runner's HTTP endpoints (job creation and job lookup)
//! using [`reqwest`].

use std::time::Duration;

use async_trait::async_trait;
use bukae_core::job::Job;
use bukae_core::job_request::JobRequest;

use crate::runner::{CreatedJob, JobRunner, RunnerError};

/// HTTP client for the studio job-runner.
pub struct StudioApi {
    client: reqwest::Client,
    api_url: String,
}

impl StudioApi {
    /// Create an API client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://host:4000`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create an API client whose requests time out after `timeout`.
    pub fn with_timeout(
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RunnerError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_url))
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    fn jobs_url(&self) -> String {
        format!("{}/studio/jobs", self.api_url)
    }

    /// URL of a single job. The id is pushed as one percent-encoded path
    /// segment, so reserved characters stay part of the id.
    fn job_url(&self, job_id: &str) -> Result<reqwest::Url, RunnerError> {
        let mut url = reqwest::Url::parse(&self.jobs_url())
            .map_err(|e| RunnerError::InvalidUrl(format!("{}: {e}", self.api_url)))?;
        url.path_segments_mut()
            .map_err(|()| RunnerError::InvalidUrl(format!("{} cannot be a base", self.api_url)))?
            .push(job_id);
        Ok(url)
    }

    /// Send a request, reporting connect failures and timeouts as
    /// [`RunnerError::Unavailable`].
    async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, RunnerError> {
        request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                RunnerError::Unavailable(e.to_string())
            } else {
                RunnerError::Request(e)
            }
        })
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, returning an
    /// [`RunnerError::Api`] with the status and body text otherwise.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, RunnerError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RunnerError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RunnerError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl JobRunner for StudioApi {
    /// `POST /studio/jobs` with the request as JSON.
    async fn create_job(&self, request: &JobRequest) -> Result<CreatedJob, RunnerError> {
        let response = Self::send(self.client.post(self.jobs_url()).json(request)).await?;
        let created: CreatedJob = Self::parse_response(response).await?;

        if created.id.trim().is_empty() {
            return Err(RunnerError::InvalidResponse(
                "job-runner returned an empty job id".into(),
            ));
        }
        Ok(created)
    }

    /// `GET /studio/jobs/{id}`. A 404 becomes [`RunnerError::NotFound`].
    async fn get_job(&self, job_id: &str) -> Result<Job, RunnerError> {
        let response = Self::send(self.client.get(self.job_url(job_id)?)).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RunnerError::NotFound(job_id.to_string()));
        }
        Self::parse_response(response).await
    }
}
