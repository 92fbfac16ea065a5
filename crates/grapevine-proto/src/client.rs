//! Transport client: one HTTP request per intent, normalized to a
//! `CommandOutcome`.
//!
//! Holds no playback state.  No retries: a request either resolves or fails
//! once, and every failure kind collapses to `CommandOutcome::Failure` at
//! `send`.

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

use crate::protocol::{ApiResponse, CommandOutcome, ControlIntent, StatusSnapshot};

/// Daemon address reported by `/ping` when the gateway leaves it out.
const UNKNOWN_DAEMON: &str = "unknown";

#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, timeout.
    #[error("daemon unreachable")]
    Unreachable(#[source] reqwest::Error),
    /// The server answered with a non-2xx status.
    #[error("{0}")]
    HttpStatus(StatusCode),
    /// HTTP success but the daemon said `ERR`.
    #[error("{0}")]
    Rejected(String),
    /// Body missing or not the expected envelope.
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone)]
pub struct DaemonClient {
    http: reqwest::Client,
    base_url: String,
}

impl DaemonClient {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:8080/api`.
    /// `timeout` of `None` keeps the platform default.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Dispatch one intent.  Never fails past this point.
    pub async fn send(&self, intent: &ControlIntent) -> CommandOutcome {
        match self.try_send(intent).await {
            Ok(()) => {
                debug!("{} accepted", intent.label());
                CommandOutcome::Success
            }
            Err(e) => {
                warn!("{} failed: {:?}", intent.label(), e);
                CommandOutcome::Failure(e.to_string())
            }
        }
    }

    async fn try_send(&self, intent: &ControlIntent) -> Result<(), TransportError> {
        let mut request = self.http.post(self.url(intent.endpoint()));
        if let Some(body) = intent.body() {
            request = request.json(&body);
        }
        accepted(execute(request).await?).map(|_| ())
    }

    /// Fetch the daemon's transport state.
    pub async fn status(&self) -> Result<StatusSnapshot, TransportError> {
        let resp = accepted(execute(self.http.get(self.url("/status"))).await?)?;
        Ok(StatusSnapshot::from_data(resp.data.as_ref()))
    }

    /// Ask the gateway which daemon it talks to.
    ///
    /// Only `data.daemon` is read; the envelope status and the HTTP status
    /// are ignored as long as the body is JSON.
    pub async fn ping(&self) -> Result<String, TransportError> {
        let response = self
            .http
            .get(self.url("/ping"))
            .send()
            .await
            .map_err(TransportError::Unreachable)?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Malformed(e.to_string()))?;
        let reply: serde_json::Value = match serde_json::from_slice(&body) {
            Ok(reply) => reply,
            Err(_) if !status.is_success() => return Err(TransportError::HttpStatus(status)),
            Err(e) => return Err(TransportError::Malformed(e.to_string())),
        };
        let daemon = reply
            .pointer("/data/daemon")
            .and_then(|v| v.as_str())
            .unwrap_or(UNKNOWN_DAEMON);
        Ok(daemon.to_string())
    }
}

async fn execute(request: RequestBuilder) -> Result<ApiResponse, TransportError> {
    let response = request.send().await.map_err(TransportError::Unreachable)?;
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::HttpStatus(status));
    }
    let body = response
        .bytes()
        .await
        .map_err(|e| TransportError::Malformed(e.to_string()))?;
    serde_json::from_slice(&body).map_err(|e| TransportError::Malformed(e.to_string()))
}

fn accepted(resp: ApiResponse) -> Result<ApiResponse, TransportError> {
    if resp.is_ok() {
        Ok(resp)
    } else {
        Err(TransportError::Rejected(resp.rejection().to_string()))
    }
}
