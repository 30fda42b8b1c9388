use crate::core::db;
use crate::core::error;
use crate::core::schemas;
use crate::core::time;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

/// Maximum retry attempts for busy/locked errors.
const MAX_RETRIES: u32 = 5;
/// Base delay for exponential backoff (milliseconds).
const BASE_DELAY_MS: u64 = 100;
/// Maximum delay cap (milliseconds).
const MAX_DELAY_MS: u64 = 2_000;

/// The DB Broker is the "Thin Waist" for state access.
///
/// Every mutation of the survey store routes through it: writes are
/// serialized behind an in-process lock (WAL keeps readers concurrent),
/// busy/locked errors retry with exponential backoff, and each brokered
/// operation appends an audit event to `pulse.events.jsonl`. The audit
/// trail is the operator surface for non-fatal follow-up failures, e.g. a
/// `filled`-flag update that did not land after a committed submission.
pub struct DbBroker {
    audit_log_path: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BrokerEvent {
    pub ts: String,
    pub event_id: String,
    pub actor: String,
    pub op: String,
    pub db_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(rusqlite::ErrorCode::DatabaseBusy) | Some(rusqlite::ErrorCode::DatabaseLocked)
    )
}

fn backoff_delay(attempt: u32) -> Duration {
    let delay = BASE_DELAY_MS.saturating_mul(1u64 << attempt.min(6));
    Duration::from_millis(delay.min(MAX_DELAY_MS))
}

impl DbBroker {
    pub fn new(root: &Path) -> Self {
        Self {
            audit_log_path: root.join(schemas::PULSE_EVENTS_NAME),
        }
    }

    /// Execute a closure with a serialized write connection to the DB.
    ///
    /// The closure may run more than once: busy/locked errors retry up to
    /// `MAX_RETRIES` times on a fresh connection, so it must not have side
    /// effects outside the database.
    pub fn with_conn<F, R>(
        &self,
        db_path: &Path,
        actor: &str,
        op_name: &str,
        f: F,
    ) -> Result<R, error::PulseError>
    where
        F: FnMut(&Connection) -> Result<R, error::PulseError>,
    {
        // One write at a time per process; cross-process contention is
        // absorbed by busy_timeout plus the retry loop.
        static WRITE_LOCK: Mutex<()> = Mutex::new(());
        let _lock = WRITE_LOCK
            .lock()
            .map_err(|_| error::PulseError::ValidationError("broker write lock poisoned".into()))?;

        let db_id = db_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let result = run_with_retry(db_path, f);

        let status = if result.is_ok() { "success" } else { "error" };
        let detail = result.as_ref().err().map(|e| e.kind().to_string());
        self.log_event(actor, op_name, &db_id, status, detail)?;

        result
    }

    /// Execute a closure with a fresh read connection (no write lock).
    pub fn with_read_conn<F, R>(&self, db_path: &Path, f: F) -> Result<R, error::PulseError>
    where
        F: FnOnce(&Connection) -> Result<R, error::PulseError>,
    {
        let conn = db::db_connect(&db_path.to_string_lossy())?;
        f(&conn)
    }

    /// Append an operator-visible event to the audit log without touching
    /// the database (used for warnings that must never fail the caller).
    pub fn record_audit_event(
        &self,
        actor: &str,
        op: &str,
        db_id: &str,
        status: &str,
        detail: Option<String>,
    ) -> Result<(), error::PulseError> {
        self.log_event(actor, op, db_id, status, detail)
    }

    fn log_event(
        &self,
        actor: &str,
        op: &str,
        db_id: &str,
        status: &str,
        detail: Option<String>,
    ) -> Result<(), error::PulseError> {
        use std::fs::OpenOptions;
        use std::io::Write;

        let ev = BrokerEvent {
            ts: time::now_epoch_z(),
            event_id: time::new_event_id(),
            actor: actor.to_string(),
            op: op.to_string(),
            db_id: db_id.to_string(),
            status: status.to_string(),
            detail,
        };

        if let Some(parent) = self.audit_log_path.parent() {
            std::fs::create_dir_all(parent).map_err(error::PulseError::IoError)?;
        }
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.audit_log_path)
            .map_err(error::PulseError::IoError)?;

        writeln!(
            f,
            "{}",
            serde_json::to_string(&ev).unwrap_or_else(|_| "{}".to_string())
        )
        .map_err(error::PulseError::IoError)?;
        Ok(())
    }
}

fn run_with_retry<F, R>(db_path: &Path, mut f: F) -> Result<R, error::PulseError>
where
    F: FnMut(&Connection) -> Result<R, error::PulseError>,
{
    let mut attempt = 0;
    loop {
        let conn = db::db_connect(&db_path.to_string_lossy())?;
        match f(&conn) {
            Err(error::PulseError::RusqliteError(e)) if is_busy(&e) && attempt < MAX_RETRIES => {
                drop(conn);
                thread::sleep(backoff_delay(attempt));
                attempt += 1;
            }
            r => return r,
        }
    }
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "broker",
        "version": "0.1.0",
        "description": "State mutation broker (The Thin Waist)",
        "commands": [
            { "name": "audit", "description": "Show the mutation audit log" }
        ],
        "storage": [schemas::PULSE_EVENTS_NAME]
    })
}
