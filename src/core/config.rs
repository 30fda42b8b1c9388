//! Operator-tunable analysis service configuration.
//!
//! Loaded once at the CLI entry from `.pulsecheck/analysis.toml` and passed
//! explicitly into the orchestrator; nothing reads it ambiently after that.

use crate::core::error::PulseError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Contractual ceiling for a single analysis request (the external service
/// can take minutes per company).
pub const MAX_REQUEST_TIMEOUT_MS: u64 = 180_000;

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8750/api/analysis";
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = MAX_REQUEST_TIMEOUT_MS;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Base URL of the external analysis service; `/individual` and
    /// `/company` are appended per call.
    pub endpoint: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// Optional bearer token forwarded to the analysis service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            auth_token: None,
        }
    }
}

impl AnalysisConfig {
    /// Liveness ceiling for a `running` marker row before it is considered
    /// abandoned and reaped.
    pub fn stale_run_ceiling_secs(&self) -> u64 {
        (self.request_timeout_ms / 1_000) * 2 + 60
    }
}

/// Load analysis config from `.pulsecheck/analysis.toml`.
///
/// Accepts either the project root (parent of `.pulsecheck`) or the store
/// root (`.pulsecheck/data`). Environment variables `PULSECHECK_ANALYSIS_URL`
/// and `PULSECHECK_ANALYSIS_TIMEOUT_MS` override the file; the timeout is
/// clamped to the contractual ceiling. No file means defaults, not an error.
pub fn load_analysis_config(dir: &Path) -> Result<AnalysisConfig, PulseError> {
    let mut config = read_config_file(dir)?.unwrap_or_default();

    if let Ok(endpoint) = std::env::var("PULSECHECK_ANALYSIS_URL") {
        if !endpoint.trim().is_empty() {
            config.endpoint = endpoint;
        }
    }
    if let Ok(raw) = std::env::var("PULSECHECK_ANALYSIS_TIMEOUT_MS") {
        let parsed = raw.trim().parse::<u64>().map_err(|_| {
            PulseError::ValidationError(format!(
                "PULSECHECK_ANALYSIS_TIMEOUT_MS is not a number: {raw}"
            ))
        })?;
        config.request_timeout_ms = parsed;
    }

    if config.endpoint.trim().is_empty() {
        return Err(PulseError::ValidationError(
            "analysis endpoint must not be empty".into(),
        ));
    }
    config.request_timeout_ms = config.request_timeout_ms.clamp(1, MAX_REQUEST_TIMEOUT_MS);
    config.connect_timeout_ms = config.connect_timeout_ms.clamp(1, MAX_REQUEST_TIMEOUT_MS);
    Ok(config)
}

fn read_config_file(dir: &Path) -> Result<Option<AnalysisConfig>, PulseError> {
    let candidates = [
        dir.join(".pulsecheck").join("analysis.toml"),
        dir.parent()
            .map(|p| p.join("analysis.toml"))
            .unwrap_or_else(|| dir.join("analysis.toml")),
    ];
    for path in &candidates {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(PulseError::IoError)?;
            let config: AnalysisConfig = toml::from_str(&content)
                .map_err(|e| PulseError::ValidationError(e.to_string()))?;
            return Ok(Some(config));
        }
    }
    Ok(None)
}
