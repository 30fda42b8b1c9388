use rusqlite;
use std::env;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("SQLite error: {0}")]
    RusqliteError(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Failed to initialize database: {0}")]
    DatabaseInitializationError(String),
    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] env::VarError),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not ready: {0}")]
    NotReady(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Analysis service unavailable: {0}")]
    ExternalUnavailable(String),
    #[error("Analysis service timed out after {timeout_ms}ms: {detail}")]
    ExternalTimeout { timeout_ms: u64, detail: String },
    #[error("Analysis service rejected the request (HTTP {status}): {detail}")]
    ExternalRejected { status: u16, detail: String },
}

impl PulseError {
    /// Stable lowercase kind string used in envelopes and run-event rows.
    pub fn kind(&self) -> &'static str {
        match self {
            PulseError::RusqliteError(_)
            | PulseError::IoError(_)
            | PulseError::DatabaseInitializationError(_)
            | PulseError::EnvVarError(_) => "internal",
            PulseError::ValidationError(_) => "invalid_input",
            PulseError::NotFound(_) => "not_found",
            PulseError::Forbidden(_) => "forbidden",
            PulseError::NotReady(_) => "not_ready",
            PulseError::Conflict(_) => "conflict",
            PulseError::ExternalUnavailable(_) => "external_unavailable",
            PulseError::ExternalTimeout { .. } => "external_timeout",
            PulseError::ExternalRejected { .. } => "external_rejected",
        }
    }
}
