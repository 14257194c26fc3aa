//! HTTP adapter for an external simulation service.
//!
//! The service answers `GET /simulate?days=N` with a JSON envelope
//! `{"status": "success", "result": {...}}` or
//! `{"status": "error", "message": "..."}`. The result is passed through
//! untouched.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::BackendError;
use crate::external::ExternalPlan;

pub const SERVICE_URL_ENV: &str = "FLEET_PLANNER_SERVICE_URL";

#[derive(Debug, Clone)]
pub struct SimulationServiceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for SimulationServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_secs: 300,
        }
    }
}

impl SimulationServiceConfig {
    /// Default config with the base URL taken from the environment when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(SERVICE_URL_ENV) {
            config.base_url = url;
        }
        config
    }
}

#[derive(Debug, Clone)]
pub struct SimulationClient {
    config: SimulationServiceConfig,
    client: reqwest::blocking::Client,
}

impl SimulationClient {
    pub fn new(config: SimulationServiceConfig) -> Result<Self, BackendError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn simulate(&self, days: Option<u32>) -> Result<ExternalPlan, BackendError> {
        let url = format!("{}/simulate", self.config.base_url.trim_end_matches('/'));
        let mut request = self.client.get(&url);
        if let Some(days) = days {
            request = request.query(&[("days", days)]);
        }
        debug!(%url, ?days, "calling simulation service");

        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        decode_response(status, &body)
    }
}

/// Decode the envelope whatever the HTTP status; a 5xx error envelope keeps its message.
fn decode_response(status: StatusCode, body: &str) -> Result<ExternalPlan, BackendError> {
    match serde_json::from_str::<SimulationEnvelope>(body) {
        Ok(envelope) if status.is_success() || envelope.status == "error" => envelope.into_plan(),
        Ok(envelope) => Err(BackendError::UnexpectedResponse(format!(
            "HTTP {status} with status {:?}",
            envelope.status
        ))),
        Err(err) if status.is_success() => {
            Err(BackendError::UnexpectedResponse(format!("malformed envelope: {err}")))
        }
        Err(_) => Err(BackendError::UnexpectedResponse(format!(
            "HTTP {status}: {}",
            body.trim()
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct SimulationEnvelope {
    status: String,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

impl SimulationEnvelope {
    fn into_plan(self) -> Result<ExternalPlan, BackendError> {
        match (self.status.as_str(), self.result) {
            ("success", Some(result)) => Ok(ExternalPlan(result)),
            ("error", _) => Err(BackendError::Service(
                self.message.unwrap_or_else(|| "unknown error".to_string()),
            )),
            (status, _) => Err(BackendError::UnexpectedResponse(format!("status {status:?}"))),
        }
    }
}
