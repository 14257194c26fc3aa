//! Alternate planning backends whose output is passed through unvalidated.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::BackendError;
use crate::remote::SimulationClient;
use crate::subprocess::ScriptRunner;

/// A plan produced outside this crate, kept as opaque JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExternalPlan(pub Value);

#[derive(Debug, Clone)]
pub struct ExternalRequest {
    /// Directory holding the CSV inputs, handed to the script runner.
    pub data_dir: PathBuf,
    pub swap_days: Option<u32>,
    /// Planning horizon in days.
    pub days: Option<u32>,
}

/// Ask the HTTP service first, then fall back to the local script.
pub fn run_external(
    service: Option<&SimulationClient>,
    script: &ScriptRunner,
    request: &ExternalRequest,
) -> Result<ExternalPlan, BackendError> {
    if let Some(service) = service {
        match service.simulate(request.days) {
            Ok(plan) => {
                info!("plan received from simulation service");
                return Ok(plan);
            }
            Err(err) => warn!(error = %err, "simulation service failed, falling back to script"),
        }
    }
    script.run(request)
}
