//! Error types for the boundaries around the planning engine.
//!
//! The engine itself does not fail; ingestion, parameter loading and the
//! external backends do.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("none of {candidates:?} found in {dir}")]
    MissingFile { dir: PathBuf, candidates: Vec<String> },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{file}: missing required column `{column}`")]
    MissingColumn { file: String, column: String },

    #[error("{file}:{line}: invalid value {value:?} for `{field}`")]
    InvalidField {
        file: String,
        line: u64,
        field: String,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed parameters: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parameter `{name}` out of range: {value}")]
    OutOfRange { name: &'static str, value: f64 },
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service error: {0}")]
    Service(String),

    #[error("unexpected service response: {0}")]
    UnexpectedResponse(String),

    #[error("no interpreter found among {0:?}")]
    NoInterpreter(Vec<String>),

    #[error("script not found: {0}")]
    ScriptMissing(PathBuf),

    #[error("script timed out after {0}s")]
    Timeout(u64),

    #[error("script failed ({status}): {stderr}")]
    ProcessFailure { status: String, stderr: String },

    #[error("script output contained no JSON")]
    NoJson,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
