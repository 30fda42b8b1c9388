//! Analysis orchestration: the two-phase external analysis drive.
//!
//! Phase 1 requests one individual report per filled non-HR employee;
//! employees are independent and a failure for one never aborts the phase.
//! Phase 2 requests the company-wide report, and only after re-checking
//! that the company is *still* submission-complete, since a reset may have
//! raced the run since the trigger fired.
//!
//! The run itself is bracketed by an `analysis_runs` marker row: slot
//! acquisition atomically checks-and-sets a `running` row per company, so
//! concurrent triggers at the completion boundary collapse to one
//! productive run (losers get `Conflict`). Outcomes and per-employee
//! failures land in the same table, which is the status surface the
//! submission path points callers at.
//!
//! External calls never hold a database connection: payloads are read
//! first, the calls run (in parallel via rayon), and results are written
//! afterwards.

use crate::core::broker::DbBroker;
use crate::core::completion;
use crate::core::config::AnalysisConfig;
use crate::core::db;
use crate::core::error;
use crate::core::guard::{self, Caller};
use crate::core::store::Store;
use crate::core::time;
use crate::plugins::directory;
use crate::plugins::report;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use rusqlite::{Connection, OptionalExtension, params};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// What started a run; recorded on the run row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    /// Scheduled by the submission path at the completion boundary.
    Auto,
    /// Requested by an operator via `analyze run`.
    Manual,
}

impl TriggerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerKind::Auto => "auto",
            TriggerKind::Manual => "manual",
        }
    }
}

/// One question/answer pair in the wire shape the service expects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerDetail {
    pub question: String,
    pub answer: String,
}

/// Wire request for one employee's individual analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualAnalysisRequest {
    pub employee_id: i64,
    pub company: String,
    /// Keyed `q<position>` in form order.
    pub answers: BTreeMap<String, AnswerDetail>,
}

/// Wire request for the company-wide analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyAnalysisRequest {
    pub company_id: i64,
}

/// The seam to the external analysis service.
///
/// Implementations own persisting the report rows they produce: the
/// orchestrator delegates the write and trusts it, it never stores report
/// rows itself.
pub trait AnalysisService: Send + Sync {
    fn analyze_individual(&self, request: &IndividualAnalysisRequest)
    -> Result<(), error::PulseError>;
    fn analyze_company(&self, request: &CompanyAnalysisRequest) -> Result<(), error::PulseError>;
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EmployeeFailure {
    pub employee_id: i64,
    pub kind: String,
    pub detail: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnalysisRunSummary {
    pub run_id: String,
    pub company_id: i64,
    pub trigger: TriggerKind,
    pub status: String,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub company_report_stored: bool,
    pub failures: Vec<EmployeeFailure>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnalysisRun {
    pub id: String,
    pub company_id: i64,
    pub trigger_kind: String,
    pub status: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub summary: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RunEvent {
    pub event_id: String,
    pub run_id: String,
    pub ts: String,
    pub kind: String,
    pub detail: String,
}

#[derive(Parser, Debug)]
#[clap(name = "analyze", about = "Drive and inspect company analysis runs")]
pub struct AnalyzeCli {
    #[clap(subcommand)]
    pub command: AnalyzeCommand,
}

#[derive(Subcommand, Debug)]
pub enum AnalyzeCommand {
    /// Run the two-phase analysis for a company.
    Run {
        #[clap(long)]
        company: String,
        /// Recorded on the run row; the submission path passes `auto`.
        #[clap(long, default_value = "manual")]
        trigger: String,
    },
    /// Recent runs and their events for a company.
    Status {
        #[clap(long)]
        company: String,
        #[clap(long, default_value = "5")]
        limit: usize,
    },
    /// Re-request the individual report for one filled employee.
    Regenerate {
        #[clap(long)]
        employee: i64,
    },
}

pub fn run_analyze_cli(
    store: &Store,
    cfg: &AnalysisConfig,
    cli: AnalyzeCli,
    caller: &Caller,
) -> Result<(), error::PulseError> {
    let service = HttpAnalysisService::new(store, cfg);
    match cli.command {
        AnalyzeCommand::Run { company, trigger } => {
            let trigger = match trigger.as_str() {
                "auto" => TriggerKind::Auto,
                "manual" => TriggerKind::Manual,
                other => {
                    return Err(error::PulseError::ValidationError(format!(
                        "unknown trigger kind: {other}"
                    )));
                }
            };
            let summary = run_company_analysis(store, cfg, &service, caller, &company, trigger)?;
            println!(
                "{}",
                time::command_envelope(
                    "analyze.run",
                    "ok",
                    serde_json::to_value(&summary).unwrap_or_default()
                )
            );
        }
        AnalyzeCommand::Status { company, limit } => {
            let runs = run_status(store, caller, &company, limit)?;
            print_run_status(&runs);
        }
        AnalyzeCommand::Regenerate { employee } => {
            let stored = regenerate(store, &service, caller, employee)?;
            println!(
                "{}",
                time::command_envelope(
                    "analyze.regenerate",
                    "ok",
                    serde_json::json!({ "employee_id": employee, "requested": stored })
                )
            );
        }
    }
    Ok(())
}

fn print_run_status(runs: &[(AnalysisRun, Vec<RunEvent>)]) {
    use colored::Colorize;
    println!(
        "{}",
        time::command_envelope(
            "analyze.status",
            "ok",
            serde_json::json!({
                "runs": runs
                    .iter()
                    .map(|(run, events)| serde_json::json!({ "run": run, "events": events }))
                    .collect::<Vec<_>>()
            })
        )
    );
    for (run, events) in runs {
        let line = format!("{} {} ({})", run.started_at, run.id, run.trigger_kind);
        match run.status.as_str() {
            "succeeded" => eprintln!("{} {}", line, run.status.green()),
            "running" => eprintln!("{} {}", line, run.status.yellow()),
            _ => eprintln!("{} {}", line, run.status.red()),
        }
        for event in events {
            eprintln!("    {} {}: {}", event.ts, event.kind, event.detail);
        }
    }
}

/// Drives both analysis phases for a company.
pub fn run_company_analysis(
    store: &Store,
    cfg: &AnalysisConfig,
    service: &dyn AnalysisService,
    caller: &Caller,
    company_ref: &str,
    trigger: TriggerKind,
) -> Result<AnalysisRunSummary, error::PulseError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::pulse_db_path(&store.root);

    // Resolve + authorize + confirm completeness before taking the slot.
    let company_id = broker.with_read_conn(&db_path, |conn| {
        let company = directory::resolve_company(conn, company_ref)?;
        guard::ensure_management(caller, company.id)?;
        let status = completion::completion_status(conn, company.id)?;
        if !status.complete {
            return Err(error::PulseError::NotReady(format!(
                "company {} is not submission-complete ({}/{} filled)",
                company.id, status.filled, status.total
            )));
        }
        Ok(company.id)
    })?;

    let run_id = acquire_run_slot(&broker, &db_path, caller, company_id, trigger, cfg)?;

    // Phase 1: read everything first, then fan the calls out.
    let requests = broker.with_read_conn(&db_path, |conn| {
        build_individual_requests(conn, company_id)
    })?;

    let mut skipped = 0usize;
    let mut calls: Vec<IndividualAnalysisRequest> = Vec::with_capacity(requests.len());
    for (employee_id, request) in requests {
        match request {
            Some(request) => calls.push(request),
            None => {
                skipped += 1;
                record_run_event(
                    &broker,
                    &db_path,
                    caller,
                    &run_id,
                    "zero_answer_skip",
                    &format!("employee {employee_id} is filled but has no persisted answers"),
                )?;
            }
        }
    }

    let attempted = calls.len();
    let outcomes: FxHashMap<i64, Result<(), error::PulseError>> = calls
        .par_iter()
        .map(|request| (request.employee_id, service.analyze_individual(request)))
        .collect();

    let mut failures = Vec::new();
    for (employee_id, outcome) in outcomes.iter() {
        if let Err(e) = outcome {
            failures.push(EmployeeFailure {
                employee_id: *employee_id,
                kind: e.kind().to_string(),
                detail: e.to_string(),
            });
            record_run_event(
                &broker,
                &db_path,
                caller,
                &run_id,
                "employee_failed",
                &format!("employee {employee_id}: {e}"),
            )?;
        }
    }
    failures.sort_by_key(|f| f.employee_id);
    let succeeded = attempted - failures.len();

    let mut summary = AnalysisRunSummary {
        run_id: run_id.clone(),
        company_id,
        trigger,
        status: "running".to_string(),
        attempted,
        succeeded,
        failed: failures.len(),
        skipped,
        company_report_stored: false,
        failures,
    };

    // The completion boundary may have moved while phase 1 ran.
    let still_complete = broker.with_read_conn(&db_path, |conn| {
        Ok(completion::completion_status(conn, company_id)?.complete)
    })?;
    if !still_complete {
        let err = error::PulseError::Conflict(format!(
            "company {company_id} is no longer submission-complete; a reset raced this run"
        ));
        record_run_event(&broker, &db_path, caller, &run_id, "recheck_failed", &err.to_string())?;
        summary.status = "failed".to_string();
        finish_run(&broker, &db_path, caller, &run_id, &summary)?;
        return Err(err);
    }

    // Phase 2: the company-level report. Failures propagate but never roll
    // back the individual reports phase 1 already produced.
    match service.analyze_company(&CompanyAnalysisRequest {
        company_id,
    }) {
        Ok(()) => {
            summary.company_report_stored = true;
            summary.status = "succeeded".to_string();
            finish_run(&broker, &db_path, caller, &run_id, &summary)?;
            Ok(summary)
        }
        Err(e) => {
            record_run_event(
                &broker,
                &db_path,
                caller,
                &run_id,
                "company_failed",
                &e.to_string(),
            )?;
            summary.status = "failed".to_string();
            finish_run(&broker, &db_path, caller, &run_id, &summary)?;
            Err(e)
        }
    }
}

/// Re-requests the individual report for one employee (the retry path for
/// "submitted but report missing").
pub fn regenerate(
    store: &Store,
    service: &dyn AnalysisService,
    caller: &Caller,
    employee_id: i64,
) -> Result<bool, error::PulseError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::pulse_db_path(&store.root);
    let request = broker.with_read_conn(&db_path, |conn| {
        let employee = directory::get_employee(conn, employee_id)?;
        guard::ensure_self_or_management(caller, employee_id, employee.company_id)?;
        if !employee.filled {
            return Err(error::PulseError::NotReady(format!(
                "employee {employee_id} has not submitted this cycle"
            )));
        }
        build_one_request(conn, &employee)
    })?;
    let Some(request) = request else {
        return Err(error::PulseError::ValidationError(format!(
            "employee {employee_id} is filled but has no persisted answers"
        )));
    };
    service.analyze_individual(&request)?;
    Ok(true)
}

/// Recent runs with their events, newest first.
pub fn run_status(
    store: &Store,
    caller: &Caller,
    company_ref: &str,
    limit: usize,
) -> Result<Vec<(AnalysisRun, Vec<RunEvent>)>, error::PulseError> {
    let broker = DbBroker::new(&store.root);
    broker.with_read_conn(&db::pulse_db_path(&store.root), |conn| {
        let company = directory::resolve_company(conn, company_ref)?;
        guard::ensure_management(caller, company.id)?;
        let mut stmt = conn.prepare(
            "SELECT id, company_id, trigger_kind, status, started_at, finished_at, summary
             FROM analysis_runs WHERE company_id = ?1
             ORDER BY started_at DESC, rowid DESC LIMIT ?2",
        )?;
        let runs = stmt
            .query_map(params![company.id, limit as i64], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        let mut result = Vec::with_capacity(runs.len());
        for run in runs {
            let mut stmt = conn.prepare(
                "SELECT event_id, run_id, ts, kind, detail FROM analysis_run_events
                 WHERE run_id = ?1 ORDER BY ts, event_id",
            )?;
            let events = stmt
                .query_map(params![run.id], |row| {
                    Ok(RunEvent {
                        event_id: row.get(0)?,
                        run_id: row.get(1)?,
                        ts: row.get(2)?,
                        kind: row.get(3)?,
                        detail: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            result.push((run, events));
        }
        Ok(result)
    })
}

/// Rejects while an analysis run is in flight for the company (used by the
/// reset lifecycle).
pub fn ensure_no_running_run(conn: &Connection, company_id: i64) -> Result<(), error::PulseError> {
    let running: Option<String> = conn
        .query_row(
            "SELECT id FROM analysis_runs WHERE company_id = ?1 AND status = 'running' LIMIT 1",
            params![company_id],
            |row| row.get(0),
        )
        .optional()?;
    match running {
        Some(run_id) => Err(error::PulseError::Conflict(format!(
            "analysis run {run_id} is in flight for company {company_id}"
        ))),
        None => Ok(()),
    }
}

/// Spawns the orchestrator as a detached child so the submission response
/// returns immediately; the child records its outcome to the status store.
pub fn schedule_detached(store: &Store, company_id: i64) -> Result<(), error::PulseError> {
    use std::process::{Command, Stdio};
    let exe = std::env::current_exe().map_err(error::PulseError::IoError)?;
    let project_root = store
        .project_dir()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .ok_or_else(|| {
            error::PulseError::ValidationError("store root has no project directory".into())
        })?;
    Command::new(exe)
        .args([
            "--actor",
            "root",
            "analyze",
            "run",
            "--company",
            &company_id.to_string(),
            "--trigger",
            "auto",
        ])
        .env("PULSECHECK_ROOT", &project_root)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(error::PulseError::IoError)?;
    Ok(())
}

fn acquire_run_slot(
    broker: &DbBroker,
    db_path: &Path,
    caller: &Caller,
    company_id: i64,
    trigger: TriggerKind,
    cfg: &AnalysisConfig,
) -> Result<String, error::PulseError> {
    let run_id = time::new_event_id();
    let ts = time::now_epoch_z();
    let stale_ceiling = cfg.stale_run_ceiling_secs();
    broker.with_conn(db_path, &caller.actor_label(), "analysis.acquire", |conn| {
        let tx = conn.unchecked_transaction()?;

        // Reap abandoned markers first: a crashed child must not wedge the
        // company forever.
        let now = time::now_unix_secs();
        {
            let mut stmt = tx.prepare(
                "SELECT id, started_at FROM analysis_runs
                 WHERE company_id = ?1 AND status = 'running'",
            )?;
            let stale: Vec<String> = stmt
                .query_map(params![company_id], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?
                .filter_map(|r| r.ok())
                .filter(|(_, started_at)| {
                    time::parse_epoch_z(started_at)
                        .map(|started| now.saturating_sub(started) > stale_ceiling)
                        .unwrap_or(true)
                })
                .map(|(id, _)| id)
                .collect();
            for stale_id in &stale {
                tx.execute(
                    "UPDATE analysis_runs SET status = 'failed', finished_at = ?1,
                     summary = ?2 WHERE id = ?3",
                    params![
                        time::now_epoch_z(),
                        "{\"stale_reaped\":true}",
                        stale_id
                    ],
                )?;
            }
        }

        let running: Option<String> = tx
            .query_row(
                "SELECT id FROM analysis_runs WHERE company_id = ?1 AND status = 'running' LIMIT 1",
                params![company_id],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(existing) = running {
            return Err(error::PulseError::Conflict(format!(
                "analysis run {existing} already in flight for company {company_id}"
            )));
        }
        tx.execute(
            "INSERT INTO analysis_runs(id, company_id, trigger_kind, status, started_at)
             VALUES(?1, ?2, ?3, 'running', ?4)",
            params![run_id, company_id, trigger.as_str(), ts],
        )?;
        tx.commit()?;
        Ok(run_id.clone())
    })
}

fn finish_run(
    broker: &DbBroker,
    db_path: &Path,
    caller: &Caller,
    run_id: &str,
    summary: &AnalysisRunSummary,
) -> Result<(), error::PulseError> {
    let summary_json = serde_json::to_value(summary).unwrap_or_default();
    broker.with_conn(db_path, &caller.actor_label(), "analysis.finish", |conn| {
        conn.execute(
            "UPDATE analysis_runs SET status = ?1, finished_at = ?2, summary = ?3 WHERE id = ?4",
            params![
                summary.status,
                time::now_epoch_z(),
                summary_json.to_string(),
                run_id
            ],
        )?;
        Ok(())
    })
}

fn record_run_event(
    broker: &DbBroker,
    db_path: &Path,
    caller: &Caller,
    run_id: &str,
    kind: &str,
    detail: &str,
) -> Result<(), error::PulseError> {
    broker.with_conn(db_path, &caller.actor_label(), "analysis.event", |conn| {
        conn.execute(
            "INSERT INTO analysis_run_events(event_id, run_id, ts, kind, detail)
             VALUES(?1, ?2, ?3, ?4, ?5)",
            params![time::new_event_id(), run_id, time::now_epoch_z(), kind, detail],
        )?;
        Ok(())
    })
}

/// Builds the phase-1 request list: `None` marks a filled employee with
/// zero persisted answers (skipped, never sent to the service).
fn build_individual_requests(
    conn: &Connection,
    company_id: i64,
) -> Result<Vec<(i64, Option<IndividualAnalysisRequest>)>, error::PulseError> {
    let employee_ids = completion::filled_employee_ids(conn, company_id)?;
    let mut requests = Vec::with_capacity(employee_ids.len());
    for employee_id in employee_ids {
        let employee = directory::get_employee(conn, employee_id)?;
        requests.push((employee_id, build_one_request(conn, &employee)?));
    }
    Ok(requests)
}

fn build_one_request(
    conn: &Connection,
    employee: &directory::Employee,
) -> Result<Option<IndividualAnalysisRequest>, error::PulseError> {
    let company_name: String = conn.query_row(
        "SELECT name FROM companies WHERE id = ?1",
        params![employee.company_id],
        |row| row.get(0),
    )?;
    let mut stmt = conn.prepare(
        "SELECT q.position, q.prompt, r.answer
         FROM survey_responses r JOIN questions q ON q.id = r.question_id
         WHERE r.employee_id = ?1 ORDER BY q.position",
    )?;
    let answers: BTreeMap<String, AnswerDetail> = stmt
        .query_map(params![employee.id], |row| {
            let position: i64 = row.get(0)?;
            Ok((
                format!("q{position}"),
                AnswerDetail {
                    question: row.get(1)?,
                    answer: row.get(2)?,
                },
            ))
        })?
        .collect::<Result<BTreeMap<_, _>, _>>()?;
    if answers.is_empty() {
        return Ok(None);
    }
    Ok(Some(IndividualAnalysisRequest {
        employee_id: employee.id,
        company: company_name,
        answers,
    }))
}

fn run_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AnalysisRun> {
    let summary_str: Option<String> = row.get(6)?;
    Ok(AnalysisRun {
        id: row.get(0)?,
        company_id: row.get(1)?,
        trigger_kind: row.get(2)?,
        status: row.get(3)?,
        started_at: row.get(4)?,
        finished_at: row.get(5)?,
        summary: summary_str.and_then(|s| serde_json::from_str(&s).ok()),
    })
}

/// Production `AnalysisService` over HTTP.
///
/// The service computes the report and this client persists what came back,
/// so a 2xx response is only a success once the row is stored. Transport
/// failures split into unavailable vs timed-out; non-2xx is a rejection.
pub struct HttpAnalysisService {
    agent: ureq::Agent,
    endpoint: String,
    auth_token: Option<String>,
    request_timeout_ms: u64,
    store: Store,
}

impl HttpAnalysisService {
    pub fn new(store: &Store, cfg: &AnalysisConfig) -> Self {
        use std::time::Duration;
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(cfg.connect_timeout_ms))
            .timeout_read(Duration::from_millis(cfg.request_timeout_ms))
            .timeout_write(Duration::from_millis(cfg.request_timeout_ms))
            .build();
        Self {
            agent,
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
            auth_token: cfg.auth_token.clone(),
            request_timeout_ms: cfg.request_timeout_ms,
            store: store.clone(),
        }
    }

    fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, error::PulseError> {
        let url = format!("{}/{}", self.endpoint, path);
        let mut req = self
            .agent
            .post(&url)
            .set("content-type", "application/json");
        if let Some(token) = self.auth_token.as_ref() {
            req = req.set("authorization", &format!("Bearer {}", token));
        }
        match req.send_string(&body.to_string()) {
            Ok(resp) => {
                let text = resp
                    .into_string()
                    .map_err(|e| error::PulseError::ExternalUnavailable(e.to_string()))?;
                Ok(serde_json::from_str(&text)
                    .unwrap_or_else(|_| serde_json::json!({ "raw": text })))
            }
            Err(ureq::Error::Status(code, resp)) => {
                let detail = resp.into_string().unwrap_or_default();
                let detail = detail.chars().take(512).collect::<String>();
                Err(error::PulseError::ExternalRejected {
                    status: code,
                    detail,
                })
            }
            Err(ureq::Error::Transport(transport)) => Err(self.map_transport(transport)),
        }
    }

    fn map_transport(&self, transport: ureq::Transport) -> error::PulseError {
        let detail = transport.to_string();
        match transport.kind() {
            ureq::ErrorKind::Dns | ureq::ErrorKind::ConnectionFailed => {
                error::PulseError::ExternalUnavailable(detail)
            }
            // Timeouts surface as Io transport errors; best-effort string
            // match without coupling to the io::ErrorKind text.
            ureq::ErrorKind::Io if detail.to_lowercase().contains("timed out") => {
                error::PulseError::ExternalTimeout {
                    timeout_ms: self.request_timeout_ms,
                    detail,
                }
            }
            _ => error::PulseError::ExternalUnavailable(detail),
        }
    }
}

impl AnalysisService for HttpAnalysisService {
    fn analyze_individual(
        &self,
        request: &IndividualAnalysisRequest,
    ) -> Result<(), error::PulseError> {
        let body = serde_json::to_value(request).unwrap_or_default();
        let payload = self.post_json("individual", &body)?;
        report::insert_individual_report(&self.store, request.employee_id, &payload)?;
        Ok(())
    }

    fn analyze_company(&self, request: &CompanyAnalysisRequest) -> Result<(), error::PulseError> {
        let body = serde_json::to_value(request).unwrap_or_default();
        let payload = self.post_json("company", &body)?;
        report::insert_company_report(&self.store, request.company_id, &payload)?;
        Ok(())
    }
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "analysis",
        "version": "0.1.0",
        "description": "Two-phase analysis orchestration with run status",
        "commands": [
            { "name": "analyze run", "description": "Run both analysis phases for a company" },
            { "name": "analyze status", "description": "Recent runs and events" },
            { "name": "analyze regenerate", "description": "Re-request one individual report" }
        ],
        "storage": ["pulse.db"]
    })
}
