use std::str::FromStr;
use std::time::Duration;

use crate::observer::{ObserverConfig, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_WARNING_THRESHOLD};

/// Default job-runner base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:4000";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Job-runner base URL.
    pub api_url: String,
    /// Timeout applied to each HTTP request, polls included.
    pub request_timeout: Duration,
    pub observer: ObserverConfig,
}

/// An environment variable held a value that could not be used.
#[derive(Debug, thiserror::Error)]
#[error("{name} has invalid value '{value}': {reason}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
    pub reason: String,
}

impl StudioConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `STUDIO_API_URL`                | `http://localhost:4000` |
    /// | `STUDIO_POLL_INTERVAL_MS`       | `2000`                  |
    /// | `STUDIO_REQUEST_TIMEOUT_SECS`   | `30`                    |
    /// | `STUDIO_POLL_WARNING_THRESHOLD` | `3`                     |
    /// | `STUDIO_MAX_WAIT_SECS`          | unset (no limit)        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("STUDIO_API_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());

        let poll_interval_ms: u64 = parse_or(
            &lookup,
            "STUDIO_POLL_INTERVAL_MS",
            DEFAULT_POLL_INTERVAL.as_millis() as u64,
        )?;
        if poll_interval_ms == 0 {
            return Err(ConfigError {
                name: "STUDIO_POLL_INTERVAL_MS",
                value: "0".into(),
                reason: "must be greater than zero".into(),
            });
        }

        let request_timeout_secs: u64 = parse_or(
            &lookup,
            "STUDIO_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let poll_warning_threshold: u32 = parse_or(
            &lookup,
            "STUDIO_POLL_WARNING_THRESHOLD",
            DEFAULT_POLL_WARNING_THRESHOLD,
        )?;
        let max_wait_secs: Option<u64> = lookup("STUDIO_MAX_WAIT_SECS")
            .map(|raw| parse_value("STUDIO_MAX_WAIT_SECS", &raw))
            .transpose()?;

        Ok(Self {
            api_url,
            request_timeout: Duration::from_secs(request_timeout_secs),
            observer: ObserverConfig {
                poll_interval: Duration::from_millis(poll_interval_ms),
                poll_warning_threshold,
                max_wait: max_wait_secs.map(Duration::from_secs),
                ..ObserverConfig::default()
            },
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => parse_value(name, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
