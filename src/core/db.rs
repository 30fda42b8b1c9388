use crate::core::broker::DbBroker;
use crate::core::error;
use crate::core::schemas;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

pub fn db_connect(db_path: &str) -> Result<Connection, error::PulseError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(error::PulseError::RusqliteError)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(error::PulseError::RusqliteError)?;
    conn.execute("PRAGMA foreign_keys=ON;", [])
        .map_err(error::PulseError::RusqliteError)?;
    Ok(conn)
}

pub fn pulse_db_path(root: &Path) -> PathBuf {
    root.join(schemas::PULSE_DB_NAME)
}

pub fn initialize_pulse_db(root: &Path) -> Result<(), error::PulseError> {
    let db_path = pulse_db_path(root);
    let parent_dir = db_path.parent().ok_or_else(|| {
        error::PulseError::DatabaseInitializationError(format!(
            "store root has no parent: {}",
            db_path.display()
        ))
    })?;
    fs::create_dir_all(parent_dir).map_err(error::PulseError::IoError)?;

    let broker = DbBroker::new(root);
    broker.with_conn(&db_path, "pulsecheck", "pulse.init", |conn| {
        for ddl in schemas::PULSE_DB_ALL {
            conn.execute(ddl, [])?;
        }
        Ok(())
    })?;

    Ok(())
}

// Subsystems share the consolidated bin so the reset lifecycle can clear
// responses, reports and flags in one transaction. Schema DDL stays in
// core::schemas; this module only wires connections.
