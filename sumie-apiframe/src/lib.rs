//! Blocking client for the APIframe Midjourney proxy: submit an imagine
//! task, fetch its state, and poll until the task reaches a terminal state.

use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ApiframeError {
    #[error("APIframe API key is missing")]
    MissingApiKey,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("APIframe returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("imagine response did not contain a task id")]
    MissingTaskId,
}

#[derive(Debug, Serialize)]
struct ImagineRequest<'a> {
    prompt: &'a str,
    aspect_ratio: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImagineResponse {
    #[serde(default)]
    task_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct FetchRequest<'a> {
    task_id: &'a str,
}

/// Snapshot of a generation task as reported by the fetch endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub percentage: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub original_image_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl TaskStatus {
    /// Synthetic status for failures that happen on our side of the wire.
    pub fn error(message: impl Into<String>) -> Self {
        TaskStatus {
            status: "error".to_string(),
            message: Some(message.into()),
            ..TaskStatus::default()
        }
    }

    pub fn state(&self) -> TaskState {
        TaskState::from_status(&self.status)
    }

    /// Progress figure for display; the API omits it while the task queues.
    pub fn percentage_display(&self) -> &str {
        self.percentage.as_deref().unwrap_or("0")
    }

    /// URLs of the generated images: the grid of variants when present,
    /// otherwise the single original image.
    pub fn resolve_image_urls(&self) -> Vec<String> {
        if !self.image_urls.is_empty() {
            return self.image_urls.clone();
        }
        self.original_image_url
            .as_ref()
            .map(|url| vec![url.clone()])
            .unwrap_or_default()
    }
}

/// Classification of the free-form status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Succeeded,
    Failed,
    InProgress,
}

impl TaskState {
    pub fn from_status(status: &str) -> Self {
        match status {
            "completed" | "finished" => TaskState::Succeeded,
            "failed" | "error" => TaskState::Failed,
            // Unrecognized statuses keep the poll alive.
            _ => TaskState::InProgress,
        }
    }
}

/// Collapse newlines and runs of whitespace so multi-line prompt literals
/// submit as a single line.
pub fn normalize_prompt(prompt: &str) -> String {
    prompt.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The two calls the generation flow needs, kept behind a trait so the
/// poller and the CLI can run against a scripted stand-in.
pub trait ImagineService {
    fn submit(&self, prompt: &str, aspect_ratio: &str) -> Result<String, ApiframeError>;
    fn fetch(&self, task_id: &str) -> TaskStatus;
}

#[derive(Debug)]
pub struct ApiframeClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl ApiframeClient {
    /// # Errors
    ///
    /// Returns [`ApiframeError::MissingApiKey`] when the provided API key is
    /// empty or whitespace only.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ApiframeError> {
        if api_key.trim().is_empty() {
            return Err(ApiframeError::MissingApiKey);
        }
        Ok(ApiframeClient {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!("{base}/{path}", base = self.base_url)
    }
}

impl ImagineService for ApiframeClient {
    /// Submit an imagine request and return the task id assigned by the API.
    ///
    /// # Errors
    ///
    /// Transport failures are surfaced via `reqwest`. A non-success response
    /// becomes [`ApiframeError::Status`] carrying the body text, and a
    /// success response without a task id becomes
    /// [`ApiframeError::MissingTaskId`].
    fn submit(&self, prompt: &str, aspect_ratio: &str) -> Result<String, ApiframeError> {
        let prompt = normalize_prompt(prompt);
        let request_body = ImagineRequest {
            prompt: &prompt,
            aspect_ratio,
        };

        debug!("submitting imagine task with aspect ratio {aspect_ratio}");
        let response = self
            .http
            .post(self.endpoint_url("imagine"))
            .header("Authorization", self.api_key.as_str())
            .json(&request_body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiframeError::Status {
                status,
                body: response.text().unwrap_or_default(),
            });
        }

        let parsed = response.json::<ImagineResponse>()?;
        let task_id = parsed
            .task_id
            .filter(|task_id| !task_id.is_empty())
            .ok_or(ApiframeError::MissingTaskId)?;
        debug!("imagine task accepted: {task_id}");
        Ok(task_id)
    }

    /// Fetch the current state of a task. Never fails: transport errors,
    /// non-success responses and unparsable bodies all come back as a
    /// synthetic `error` status, so the poll loop sees every outcome as a
    /// [`TaskStatus`].
    fn fetch(&self, task_id: &str) -> TaskStatus {
        let response = self
            .http
            .post(self.endpoint_url("fetch"))
            .header("Authorization", self.api_key.as_str())
            .json(&FetchRequest { task_id })
            .send();

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                warn!("fetch for task {task_id} failed in transport: {err}");
                return TaskStatus::error(err.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("fetch for task {task_id} returned HTTP {status}");
            let body = response.text().unwrap_or_default();
            return TaskStatus::error(format!("HTTP {status}: {body}"));
        }

        match response.json::<TaskStatus>() {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("fetch for task {task_id} returned an unparsable body: {err}");
                TaskStatus::error(err.to_string())
            }
        }
    }
}

/// Timing knobs for [`poll_until_terminal`].
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            timeout: DEFAULT_POLL_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PollOutcome {
    Completed(TaskStatus),
    Failed(TaskStatus),
    TimedOut,
}

/// Fetch the task state until it reaches a terminal state or the timeout
/// budget runs out. Non-terminal snapshots are handed to `on_tick` for
/// progress display. The sleep between fetches never overshoots the
/// remaining budget, so short timeouts return promptly.
pub fn poll_until_terminal<S, F>(
    service: &S,
    task_id: &str,
    config: &PollConfig,
    mut on_tick: F,
) -> PollOutcome
where
    S: ImagineService + ?Sized,
    F: FnMut(&TaskStatus),
{
    let started = Instant::now();
    loop {
        let status = service.fetch(task_id);
        match status.state() {
            TaskState::Succeeded => {
                debug!("task {task_id} completed");
                return PollOutcome::Completed(status);
            }
            TaskState::Failed => {
                debug!("task {task_id} ended with status '{}'", status.status);
                return PollOutcome::Failed(status);
            }
            TaskState::InProgress => on_tick(&status),
        }

        let remaining = config.timeout.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            return PollOutcome::TimedOut;
        }
        thread::sleep(remaining.min(config.interval));
    }
}
