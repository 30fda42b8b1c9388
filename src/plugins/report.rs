//! Report store and the reset lifecycle.
//!
//! Report rows are append-only and retrieval is latest-wins; the company
//! report is additionally gated on *current* completion so a stale row from
//! a previous cycle is never served. Reset is the only way submission and
//! report state returns to the start of the lifecycle, and it is a single
//! transaction: responses, individual reports, the company report and the
//! `filled` flags clear together or not at all.

use crate::core::broker::DbBroker;
use crate::core::completion;
use crate::core::db;
use crate::core::error;
use crate::core::guard::{self, Caller};
use crate::core::store::Store;
use crate::core::time;
use crate::plugins::analysis;
use crate::plugins::directory;
use clap::{Parser, Subcommand};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReportRow {
    pub id: String,
    pub payload: serde_json::Value,
    pub content_hash: String,
    pub created_at: String,
}

/// Individual report availability, with the two "no report" sub-states.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReportAvailability {
    /// Latest generated report.
    Report { report: ReportRow },
    /// The employee has not submitted this cycle.
    NotSubmitted,
    /// Submitted, but no report row exists: an orchestrator failure the
    /// caller can retry via `analyze regenerate`.
    Pending,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResetOutcome {
    pub company_id: i64,
    pub employees_reset: usize,
    pub responses_deleted: usize,
    pub individual_reports_deleted: usize,
    pub company_report_deleted: bool,
}

#[derive(Parser, Debug)]
#[clap(name = "report", about = "Retrieve analysis reports and reset survey cycles")]
pub struct ReportCli {
    #[clap(subcommand)]
    pub command: ReportCommand,
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Latest individual report for an employee.
    Employee {
        #[clap(long)]
        employee: i64,
    },
    /// Latest company report (requires current completion).
    Company {
        #[clap(long)]
        company: String,
    },
    /// Clear responses, reports and filled flags for a company.
    Reset {
        #[clap(long)]
        company: String,
        /// Only reset employees who have already submitted.
        #[clap(long)]
        only_filled: bool,
    },
    /// Let one employee retake the survey.
    ResetOne {
        #[clap(long)]
        employee: i64,
    },
}

pub fn run_report_cli(
    store: &Store,
    cli: ReportCli,
    caller: &Caller,
) -> Result<(), error::PulseError> {
    match cli.command {
        ReportCommand::Employee { employee } => {
            let availability = individual_report(store, caller, employee)?;
            println!(
                "{}",
                time::command_envelope(
                    "report.employee",
                    "ok",
                    serde_json::json!({
                        "employee_id": employee,
                        "availability": availability
                    })
                )
            );
        }
        ReportCommand::Company { company } => {
            let report = company_report(store, caller, &company)?;
            println!(
                "{}",
                time::command_envelope(
                    "report.company",
                    "ok",
                    serde_json::json!({ "report": report })
                )
            );
        }
        ReportCommand::Reset {
            company,
            only_filled,
        } => {
            let outcome = reset(store, caller, &company, only_filled)?;
            println!(
                "{}",
                time::command_envelope(
                    "report.reset",
                    "ok",
                    serde_json::to_value(&outcome).unwrap_or_default()
                )
            );
        }
        ReportCommand::ResetOne { employee } => {
            let outcome = reset_one(store, caller, employee)?;
            println!(
                "{}",
                time::command_envelope(
                    "report.reset_one",
                    "ok",
                    serde_json::to_value(&outcome).unwrap_or_default()
                )
            );
        }
    }
    Ok(())
}

/// Latest individual report, or which "no report" sub-state applies.
pub fn individual_report(
    store: &Store,
    caller: &Caller,
    employee_id: i64,
) -> Result<ReportAvailability, error::PulseError> {
    let broker = DbBroker::new(&store.root);
    broker.with_read_conn(&db::pulse_db_path(&store.root), |conn| {
        let employee = directory::get_employee(conn, employee_id)?;
        guard::ensure_self_or_management(caller, employee_id, employee.company_id)?;
        let report = latest_individual_report(conn, employee_id)?;
        Ok(match report {
            Some(report) => ReportAvailability::Report { report },
            None if !employee.filled => ReportAvailability::NotSubmitted,
            None => ReportAvailability::Pending,
        })
    })
}

/// Latest company report. `NotReady` unless the company is complete *right
/// now* and a report row exists; readiness is re-derived on every call.
pub fn company_report(
    store: &Store,
    caller: &Caller,
    company_ref: &str,
) -> Result<ReportRow, error::PulseError> {
    let broker = DbBroker::new(&store.root);
    broker.with_read_conn(&db::pulse_db_path(&store.root), |conn| {
        let company = directory::resolve_company(conn, company_ref)?;
        guard::ensure_management(caller, company.id)?;
        let status = completion::completion_status(conn, company.id)?;
        if !status.complete {
            return Err(error::PulseError::NotReady(format!(
                "company {} is not submission-complete ({}/{} filled)",
                company.id, status.filled, status.total
            )));
        }
        latest_company_report(conn, company.id)?.ok_or_else(|| {
            error::PulseError::NotReady(format!(
                "company {} analysis has not produced a report yet",
                company.id
            ))
        })
    })
}

/// Company-wide reset: one transaction across responses, reports and flags.
pub fn reset(
    store: &Store,
    caller: &Caller,
    company_ref: &str,
    only_filled: bool,
) -> Result<ResetOutcome, error::PulseError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::pulse_db_path(&store.root);
    broker.with_conn(&db_path, &caller.actor_label(), "report.reset", |conn| {
        let company = directory::resolve_company(conn, company_ref)?;
        guard::ensure_management(caller, company.id)?;
        analysis::ensure_no_running_run(conn, company.id)?;

        let tx = conn.unchecked_transaction()?;
        let employee_ids: Vec<i64> = {
            let sql = if only_filled {
                "SELECT id FROM employees WHERE company_id = ?1 AND filled = 1 ORDER BY id"
            } else {
                "SELECT id FROM employees WHERE company_id = ?1 ORDER BY id"
            };
            let mut stmt = tx.prepare(sql)?;
            let ids = stmt
                .query_map(params![company.id], |row| row.get(0))?
                .collect::<Result<Vec<_>, _>>()?;
            ids
        };

        let mut responses_deleted = 0usize;
        let mut reports_deleted = 0usize;
        for employee_id in &employee_ids {
            responses_deleted += tx.execute(
                "DELETE FROM survey_responses WHERE employee_id = ?1",
                params![employee_id],
            )?;
            reports_deleted += tx.execute(
                "DELETE FROM individual_reports WHERE employee_id = ?1",
                params![employee_id],
            )?;
            tx.execute(
                "UPDATE employees SET filled = 0 WHERE id = ?1",
                params![employee_id],
            )?;
        }
        let company_report_deleted = tx.execute(
            "DELETE FROM company_reports WHERE company_id = ?1",
            params![company.id],
        )? > 0;
        tx.commit()?;

        Ok(ResetOutcome {
            company_id: company.id,
            employees_reset: employee_ids.len(),
            responses_deleted,
            individual_reports_deleted: reports_deleted,
            company_report_deleted,
        })
    })
}

/// Single-employee reset: clears that employee's responses, reports and
/// flag, and drops the company report, which is stale relative to the
/// re-opened employee and must be regenerated after the next completion.
pub fn reset_one(
    store: &Store,
    caller: &Caller,
    employee_id: i64,
) -> Result<ResetOutcome, error::PulseError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::pulse_db_path(&store.root);
    broker.with_conn(&db_path, &caller.actor_label(), "report.reset_one", |conn| {
        let employee = directory::get_employee(conn, employee_id)?;
        guard::ensure_management(caller, employee.company_id)?;
        analysis::ensure_no_running_run(conn, employee.company_id)?;

        let tx = conn.unchecked_transaction()?;
        let responses_deleted = tx.execute(
            "DELETE FROM survey_responses WHERE employee_id = ?1",
            params![employee_id],
        )?;
        let reports_deleted = tx.execute(
            "DELETE FROM individual_reports WHERE employee_id = ?1",
            params![employee_id],
        )?;
        tx.execute(
            "UPDATE employees SET filled = 0 WHERE id = ?1",
            params![employee_id],
        )?;
        let company_report_deleted = tx.execute(
            "DELETE FROM company_reports WHERE company_id = ?1",
            params![employee.company_id],
        )? > 0;
        tx.commit()?;

        Ok(ResetOutcome {
            company_id: employee.company_id,
            employees_reset: 1,
            responses_deleted,
            individual_reports_deleted: reports_deleted,
            company_report_deleted,
        })
    })
}

/// Appends an individual report row (latest-wins retrieval).
pub fn insert_individual_report(
    store: &Store,
    employee_id: i64,
    payload: &serde_json::Value,
) -> Result<ReportRow, error::PulseError> {
    let row = new_report_row(payload);
    let broker = DbBroker::new(&store.root);
    let db_path = db::pulse_db_path(&store.root);
    broker.with_conn(&db_path, "analysis-service", "report.store_individual", |conn| {
        conn.execute(
            "INSERT INTO individual_reports(id, employee_id, payload, content_hash, created_at)
             VALUES(?1, ?2, ?3, ?4, ?5)",
            params![
                row.id,
                employee_id,
                row.payload.to_string(),
                row.content_hash,
                row.created_at
            ],
        )?;
        Ok(())
    })?;
    Ok(row)
}

/// Appends a company report row (latest-wins retrieval).
pub fn insert_company_report(
    store: &Store,
    company_id: i64,
    payload: &serde_json::Value,
) -> Result<ReportRow, error::PulseError> {
    let row = new_report_row(payload);
    let broker = DbBroker::new(&store.root);
    let db_path = db::pulse_db_path(&store.root);
    broker.with_conn(&db_path, "analysis-service", "report.store_company", |conn| {
        conn.execute(
            "INSERT INTO company_reports(id, company_id, payload, content_hash, created_at)
             VALUES(?1, ?2, ?3, ?4, ?5)",
            params![
                row.id,
                company_id,
                row.payload.to_string(),
                row.content_hash,
                row.created_at
            ],
        )?;
        Ok(())
    })?;
    Ok(row)
}

pub fn latest_individual_report(
    conn: &Connection,
    employee_id: i64,
) -> Result<Option<ReportRow>, error::PulseError> {
    let row = conn
        .query_row(
            "SELECT id, payload, content_hash, created_at FROM individual_reports
             WHERE employee_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT 1",
            params![employee_id],
            report_from_row,
        )
        .optional()?;
    Ok(row)
}

pub fn latest_company_report(
    conn: &Connection,
    company_id: i64,
) -> Result<Option<ReportRow>, error::PulseError> {
    let row = conn
        .query_row(
            "SELECT id, payload, content_hash, created_at FROM company_reports
             WHERE company_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT 1",
            params![company_id],
            report_from_row,
        )
        .optional()?;
    Ok(row)
}

fn new_report_row(payload: &serde_json::Value) -> ReportRow {
    ReportRow {
        id: time::new_event_id(),
        payload: payload.clone(),
        content_hash: content_hash(payload),
        created_at: time::now_epoch_z(),
    }
}

/// Hex SHA-256 over the serialized payload, for dedup and audit.
pub fn content_hash(payload: &serde_json::Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.to_string().as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

fn report_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReportRow> {
    let payload_str: String = row.get(1)?;
    let payload = serde_json::from_str(&payload_str)
        .unwrap_or_else(|_| serde_json::json!({ "raw": payload_str }));
    Ok(ReportRow {
        id: row.get(0)?,
        payload,
        content_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "report",
        "version": "0.1.0",
        "description": "Report retrieval and the reset lifecycle",
        "commands": [
            { "name": "report employee", "description": "Latest individual report" },
            { "name": "report company", "description": "Latest company report (completion-gated)" },
            { "name": "report reset", "description": "Company-wide cycle reset" },
            { "name": "report reset-one", "description": "Single-employee retake" }
        ],
        "storage": ["pulse.db"]
    })
}
