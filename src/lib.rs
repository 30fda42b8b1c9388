//! Pulsecheck: a control plane for multi-tenant sentiment surveys
//!
//! **Pulsecheck is a daemonless, local-first backend for employee sentiment
//! surveys across isolated client companies.**
//!
//! Employees of a company fill in a questionnaire; the moment every non-HR
//! employee has submitted, Pulsecheck kicks off AI-generated per-employee
//! and company-wide reports, without ever letting one company observe
//! another company's data.
//!
//! # Core Principles
//!
//! - **Local-first**: All state is one SQLite bin plus a JSONL audit log
//! - **Tenant-isolated**: The company is the unit of isolation; the access
//!   guard enforces it on every read and mutation
//! - **Atomic lifecycle**: Submissions and resets are single transactions;
//!   report retrieval is latest-wins and completion-gated
//! - **Detached orchestration**: Analysis runs as a spawned child recording
//!   into a status store; submissions never block on it
//!
//! # Architecture
//!
//! ## The Thin Waist
//!
//! All state mutations route through `DbBroker` for:
//! - Serialization (in-process write lock, busy retry)
//! - Audit logging (`pulse.events.jsonl`)
//!
//! ## Subsystems (Plugins)
//!
//! - `directory`: companies and employees, id-or-name resolution, import
//! - `survey`: forms, atomic submissions, completion status
//! - `analysis`: two-phase external analysis with run markers and events
//! - `report`: latest-wins retrieval, NotReady gating, reset lifecycle
//!
//! # Examples
//!
//! ```bash
//! # Bootstrap a project
//! pulsecheck init
//!
//! # Register a company and its roster
//! pulsecheck company add --name "Acme Corp"
//! pulsecheck employee import --company "Acme Corp" --file roster.json
//!
//! # Seed the built-in questionnaire
//! pulsecheck form seed
//!
//! # An employee submits
//! pulsecheck --actor 3 survey submit --employee 3 --form 1 --answers '[...]'
//!
//! # HR watches completion and reads the report once analysis lands
//! pulsecheck --actor 1 survey company --company "Acme Corp"
//! pulsecheck --actor 1 report company --company "Acme Corp"
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: shared primitives (store, broker, schema, errors, guard,
//!   completion detection)
//! - [`plugins`]: subsystem implementations

pub mod core;
pub mod plugins;

use core::{
    config, db, error,
    guard::{self, Caller},
    store::{self, Store},
    time,
};
use plugins::{analysis, directory, report, survey};

use clap::Parser;
use std::path::PathBuf;

mod cli;
use cli::{Cli, Command};

pub fn run() -> Result<(), error::PulseError> {
    let cli = Cli::parse();
    let current_dir = std::env::current_dir()?;

    match cli.command {
        Command::Version => {
            // Simple output for scripts/parsing
            println!("v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Init(init) => {
            let target_dir = init.dir.unwrap_or(current_dir);
            init_project(&target_dir)
        }
        Command::Schema(schema_cli) => {
            let mut schemas = std::collections::BTreeMap::new();
            schemas.insert("broker", core::broker::schema());
            schemas.insert("directory", directory::schema());
            schemas.insert("survey", survey::schema());
            schemas.insert("analysis", analysis::schema());
            schemas.insert("report", report::schema());

            let output = if let Some(sub) = schema_cli.subsystem {
                schemas
                    .get(sub.as_str())
                    .cloned()
                    .unwrap_or(serde_json::json!({ "error": "subsystem not found" }))
            } else {
                serde_json::json!({
                    "schema_version": "1.0.0",
                    "subsystems": schemas
                })
            };
            println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
            Ok(())
        }
        command => {
            let project_root = resolve_project_root(&current_dir)?;
            let store = Store::new(store::store_root_for(&project_root));
            let caller = resolve_caller(&store, cli.actor.as_deref())?;
            dispatch(&store, &project_root, command, &caller)
        }
    }
}

fn dispatch(
    store: &Store,
    project_root: &std::path::Path,
    command: Command,
    caller: &Caller,
) -> Result<(), error::PulseError> {
    match command {
        Command::Company(company_cli) => directory::run_company_cli(store, company_cli, caller),
        Command::Employee(employee_cli) => directory::run_employee_cli(store, employee_cli, caller),
        Command::Form(form_cli) => survey::run_form_cli(store, form_cli, caller),
        Command::Survey(survey_cli) => {
            let outcome = survey::run_survey_cli(store, survey_cli, caller)?;
            // The "saved" envelope is already printed; scheduling happens
            // after, detached, so orchestration can never fail a submission.
            if let Some(outcome) = outcome {
                if outcome.analysis_due {
                    if let Err(e) = analysis::schedule_detached(store, outcome.company_id) {
                        let broker = core::broker::DbBroker::new(&store.root);
                        let _ = broker.record_audit_event(
                            &caller.actor_label(),
                            "analysis.schedule_failed",
                            core::schemas::PULSE_DB_NAME,
                            "warning",
                            Some(e.to_string()),
                        );
                    }
                }
            }
            Ok(())
        }
        Command::Analyze(analyze_cli) => {
            let cfg = config::load_analysis_config(project_root)?;
            analysis::run_analyze_cli(store, &cfg, analyze_cli, caller)
        }
        Command::Report(report_cli) => report::run_report_cli(store, report_cli, caller),
        Command::Init(_) | Command::Schema(_) | Command::Version => {
            unreachable!("handled before dispatch")
        }
    }
}

/// Project root resolution: explicit `PULSECHECK_ROOT`, then the nearest
/// ancestor holding a `.pulsecheck` directory.
fn resolve_project_root(current_dir: &std::path::Path) -> Result<PathBuf, error::PulseError> {
    if let Ok(root) = std::env::var("PULSECHECK_ROOT") {
        let root = PathBuf::from(root);
        if root.join(store::PROJECT_DIR_NAME).is_dir() {
            return Ok(root);
        }
        return Err(error::PulseError::NotFound(format!(
            "PULSECHECK_ROOT does not contain {}: {}",
            store::PROJECT_DIR_NAME,
            root.display()
        )));
    }
    store::find_project_root(current_dir).ok_or_else(|| {
        error::PulseError::NotFound(
            "no .pulsecheck project found; run `pulsecheck init` first".into(),
        )
    })
}

fn resolve_caller(store: &Store, actor_flag: Option<&str>) -> Result<Caller, error::PulseError> {
    let actor = match actor_flag {
        Some(actor) => actor.to_string(),
        None => std::env::var("PULSECHECK_ACTOR").unwrap_or_else(|_| "root".to_string()),
    };
    let broker = core::broker::DbBroker::new(&store.root);
    broker.with_read_conn(&db::pulse_db_path(&store.root), |conn| {
        guard::resolve_actor(conn, &actor)
    })
}

/// Bootstrap `.pulsecheck/data`, the schema, and a default `analysis.toml`.
pub fn init_project(target_dir: &std::path::Path) -> Result<(), error::PulseError> {
    use colored::Colorize;

    std::fs::create_dir_all(target_dir).map_err(error::PulseError::IoError)?;
    let target_dir = std::fs::canonicalize(target_dir).map_err(error::PulseError::IoError)?;
    let store_root = store::store_root_for(&target_dir);
    db::initialize_pulse_db(&store_root)?;

    let config_path = target_dir.join(store::PROJECT_DIR_NAME).join("analysis.toml");
    if !config_path.exists() {
        let default_config = config::AnalysisConfig::default();
        let rendered = toml::to_string_pretty(&default_config)
            .map_err(|e| error::PulseError::ValidationError(e.to_string()))?;
        std::fs::write(&config_path, rendered).map_err(error::PulseError::IoError)?;
    }

    eprintln!();
    eprintln!(
        "  {}  {}",
        "PULSECHECK".bright_cyan().bold(),
        "sentiment survey control plane".bright_white()
    );
    eprintln!();
    println!(
        "{}",
        time::command_envelope(
            "init",
            "ok",
            serde_json::json!({
                "store_root": store_root.display().to_string(),
                "config": config_path.display().to_string()
            })
        )
    );
    Ok(())
}
