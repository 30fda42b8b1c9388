//! Survey submission store: forms, questions, answers, and the `filled`
//! flag lifecycle.
//!
//! A submission is atomic from the caller's perspective: every answer row
//! of a batch lands in one transaction or none do. The `filled` flag is set
//! in a separate follow-up step: answers take precedence, so a failed flag
//! update never fails the submission, but it is surfaced to operators via
//! the broker audit log and the returned outcome.

use crate::core::broker::DbBroker;
use crate::core::completion::{self, CompletionStatus, MissingEmployee};
use crate::core::db;
use crate::core::error;
use crate::core::guard::{self, Caller};
use crate::core::store::Store;
use crate::core::time;
use crate::plugins::directory;
use clap::{Parser, Subcommand};
use rusqlite::{Connection, OptionalExtension, params};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Built-in questionnaire shipped with the binary and seeded by `form seed`.
#[derive(RustEmbed)]
#[folder = "assets/questionnaire/"]
#[include = "*.json"]
struct QuestionnaireAssets;

const DEFAULT_FORM_ASSET: &str = "core_sentiment.json";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Form {
    pub id: i64,
    pub title: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Question {
    pub id: i64,
    pub form_id: i64,
    pub position: i64,
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnswerInput {
    pub question_id: i64,
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct EmbeddedForm {
    title: String,
    questions: Vec<String>,
}

/// Result of a successful submission.
///
/// `filled_flag_set = false` means the answers committed but the follow-up
/// flag update failed. That is distinguishable from a failed submission, and
/// already on the operator audit log by the time the caller sees it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubmitOutcome {
    pub employee_id: i64,
    pub company_id: i64,
    pub form_id: i64,
    pub answers_saved: usize,
    pub filled_flag_set: bool,
    pub completion: CompletionStatus,
    /// True when this submission completed the company and an analysis run
    /// should be scheduled.
    pub analysis_due: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CompanyStatus {
    pub company_id: i64,
    pub company_name: String,
    pub completion: CompletionStatus,
    pub missing: Vec<MissingEmployee>,
}

#[derive(Parser, Debug)]
#[clap(name = "form", about = "Manage survey forms")]
pub struct FormCli {
    #[clap(subcommand)]
    pub command: FormCommand,
}

#[derive(Subcommand, Debug)]
pub enum FormCommand {
    /// Seed the built-in questionnaire (idempotent).
    Seed,
    /// List forms.
    List,
    /// Show a form with its questions.
    Show {
        #[clap(long)]
        form: i64,
    },
}

#[derive(Parser, Debug)]
#[clap(name = "survey", about = "Submit surveys and inspect completion state")]
pub struct SurveyCli {
    #[clap(subcommand)]
    pub command: SurveyCommand,
}

#[derive(Subcommand, Debug)]
pub enum SurveyCommand {
    /// Submit a full answer batch for an employee.
    Submit {
        #[clap(long)]
        employee: i64,
        #[clap(long)]
        form: i64,
        /// Inline JSON array of {question_id, answer} objects.
        #[clap(long, conflicts_with = "answers_file")]
        answers: Option<String>,
        /// Path to a JSON file with the same shape.
        #[clap(long)]
        answers_file: Option<String>,
    },
    /// Per-employee submission status.
    Status {
        #[clap(long)]
        employee: i64,
    },
    /// Company-wide completion status with the not-yet-filled list.
    Company {
        #[clap(long)]
        company: String,
    },
}

pub fn run_form_cli(store: &Store, cli: FormCli, caller: &Caller) -> Result<(), error::PulseError> {
    match cli.command {
        FormCommand::Seed => {
            let form = seed_default_form(store, caller)?;
            println!(
                "{}",
                time::command_envelope(
                    "form.seed",
                    "ok",
                    serde_json::json!({ "id": form.id, "title": form.title })
                )
            );
        }
        FormCommand::List => {
            let forms = list_forms(store)?;
            println!(
                "{}",
                time::command_envelope("form.list", "ok", serde_json::json!({ "forms": forms }))
            );
        }
        FormCommand::Show { form } => {
            let (form, questions) = get_form(store, form)?;
            println!(
                "{}",
                time::command_envelope(
                    "form.show",
                    "ok",
                    serde_json::json!({ "form": form, "questions": questions })
                )
            );
        }
    }
    Ok(())
}

pub fn run_survey_cli(
    store: &Store,
    cli: SurveyCli,
    caller: &Caller,
) -> Result<Option<SubmitOutcome>, error::PulseError> {
    match cli.command {
        SurveyCommand::Submit {
            employee,
            form,
            answers,
            answers_file,
        } => {
            let raw = match (answers, answers_file) {
                (Some(inline), _) => inline,
                (None, Some(path)) => {
                    std::fs::read_to_string(&path).map_err(error::PulseError::IoError)?
                }
                (None, None) => {
                    return Err(error::PulseError::ValidationError(
                        "provide --answers or --answers-file".into(),
                    ));
                }
            };
            let parsed: Vec<AnswerInput> = serde_json::from_str(&raw)
                .map_err(|e| error::PulseError::ValidationError(format!("answers JSON: {e}")))?;
            let outcome = submit(store, caller, employee, form, &parsed)?;
            println!(
                "{}",
                time::command_envelope(
                    "survey.submit",
                    "ok",
                    serde_json::to_value(&outcome).unwrap_or_default()
                )
            );
            return Ok(Some(outcome));
        }
        SurveyCommand::Status { employee } => {
            let (employee, filled) = submission_status(store, caller, employee)?;
            println!(
                "{}",
                time::command_envelope(
                    "survey.status",
                    "ok",
                    serde_json::json!({
                        "employee_id": employee.id,
                        "name": employee.name,
                        "filled": filled
                    })
                )
            );
        }
        SurveyCommand::Company { company } => {
            let status = company_status(store, caller, &company)?;
            print_company_status(&status);
        }
    }
    Ok(None)
}

fn print_company_status(status: &CompanyStatus) {
    use colored::Colorize;
    println!(
        "{}",
        time::command_envelope(
            "survey.company",
            "ok",
            serde_json::to_value(status).unwrap_or_default()
        )
    );
    let headline = format!(
        "{}: {}/{} submitted",
        status.company_name, status.completion.filled, status.completion.total
    );
    if status.completion.complete {
        eprintln!("{}", headline.green().bold());
    } else {
        eprintln!("{}", headline.yellow().bold());
        for missing in &status.missing {
            eprintln!("  {} {} <{}>", "missing:".red(), missing.name, missing.email);
        }
    }
}

/// Seeds the embedded default questionnaire. Idempotent: an existing form
/// with the same title is returned untouched.
pub fn seed_default_form(store: &Store, caller: &Caller) -> Result<Form, error::PulseError> {
    if !caller.is_superuser() {
        return Err(error::PulseError::Forbidden(
            "only an administrator may seed forms".into(),
        ));
    }
    let asset = QuestionnaireAssets::get(DEFAULT_FORM_ASSET).ok_or_else(|| {
        error::PulseError::ValidationError(format!("embedded asset missing: {DEFAULT_FORM_ASSET}"))
    })?;
    let embedded: EmbeddedForm = serde_json::from_slice(asset.data.as_ref())
        .map_err(|e| error::PulseError::ValidationError(format!("embedded questionnaire: {e}")))?;
    create_form(store, caller, &embedded.title, &embedded.questions)
}

/// Creates a form with its questions in one transaction. Returns the
/// existing form when the title is already registered.
pub fn create_form(
    store: &Store,
    caller: &Caller,
    title: &str,
    prompts: &[String],
) -> Result<Form, error::PulseError> {
    if prompts.is_empty() {
        return Err(error::PulseError::ValidationError(
            "a form needs at least one question".into(),
        ));
    }
    let ts = time::now_epoch_z();
    let broker = DbBroker::new(&store.root);
    let db_path = db::pulse_db_path(&store.root);
    broker.with_conn(&db_path, &caller.actor_label(), "form.create", |conn| {
        if let Some(existing) = conn
            .query_row(
                "SELECT id, title, created_at FROM forms WHERE title = ?1",
                params![title],
                form_from_row,
            )
            .optional()?
        {
            return Ok(existing);
        }
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO forms(title, created_at) VALUES(?1, ?2)",
            params![title, ts],
        )?;
        let form_id = tx.last_insert_rowid();
        for (idx, prompt) in prompts.iter().enumerate() {
            tx.execute(
                "INSERT INTO questions(form_id, position, prompt) VALUES(?1, ?2, ?3)",
                params![form_id, (idx + 1) as i64, prompt],
            )?;
        }
        tx.commit()?;
        Ok(Form {
            id: form_id,
            title: title.to_string(),
            created_at: ts.clone(),
        })
    })
}

pub fn list_forms(store: &Store) -> Result<Vec<Form>, error::PulseError> {
    let broker = DbBroker::new(&store.root);
    broker.with_read_conn(&db::pulse_db_path(&store.root), |conn| {
        let mut stmt = conn.prepare("SELECT id, title, created_at FROM forms ORDER BY id")?;
        let rows = stmt
            .query_map([], form_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

pub fn get_form(store: &Store, form_id: i64) -> Result<(Form, Vec<Question>), error::PulseError> {
    let broker = DbBroker::new(&store.root);
    broker.with_read_conn(&db::pulse_db_path(&store.root), |conn| {
        let form = conn
            .query_row(
                "SELECT id, title, created_at FROM forms WHERE id = ?1",
                params![form_id],
                form_from_row,
            )
            .optional()?
            .ok_or_else(|| error::PulseError::NotFound(format!("form {form_id}")))?;
        let questions = form_questions(conn, form_id)?;
        Ok((form, questions))
    })
}

pub fn form_questions(conn: &Connection, form_id: i64) -> Result<Vec<Question>, error::PulseError> {
    let mut stmt = conn.prepare(
        "SELECT id, form_id, position, prompt FROM questions
         WHERE form_id = ?1 ORDER BY position",
    )?;
    let rows = stmt
        .query_map(params![form_id], |row| {
            Ok(Question {
                id: row.get(0)?,
                form_id: row.get(1)?,
                position: row.get(2)?,
                prompt: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Submits an employee's full answer batch.
///
/// All answer rows land in one transaction. The `filled` flag update runs
/// afterwards, outside that transaction; its failure is downgraded to an
/// audit warning because committed answers must win over the flag.
pub fn submit(
    store: &Store,
    caller: &Caller,
    employee_id: i64,
    form_id: i64,
    answers: &[AnswerInput],
) -> Result<SubmitOutcome, error::PulseError> {
    if answers.is_empty() {
        return Err(error::PulseError::ValidationError(
            "submission contains no answers".into(),
        ));
    }
    let ts = time::now_epoch_z();
    let broker = DbBroker::new(&store.root);
    let db_path = db::pulse_db_path(&store.root);

    let company_id = broker.with_conn(&db_path, &caller.actor_label(), "survey.submit", |conn| {
        let employee = directory::get_employee(conn, employee_id)?;
        guard::ensure_self_or_management(caller, employee_id, employee.company_id)?;
        if employee.filled {
            return Err(error::PulseError::Conflict(format!(
                "employee {employee_id} already submitted this cycle; reset first"
            )));
        }

        let questions = form_questions(conn, form_id)?;
        if questions.is_empty() {
            return Err(error::PulseError::NotFound(format!("form {form_id}")));
        }
        let known: HashSet<i64> = questions.iter().map(|q| q.id).collect();
        let mut seen: HashSet<i64> = HashSet::new();
        for answer in answers {
            if !known.contains(&answer.question_id) {
                return Err(error::PulseError::ValidationError(format!(
                    "question {} does not belong to form {form_id}",
                    answer.question_id
                )));
            }
            if !seen.insert(answer.question_id) {
                return Err(error::PulseError::ValidationError(format!(
                    "duplicate answer for question {}",
                    answer.question_id
                )));
            }
            if answer.answer.trim().is_empty() {
                return Err(error::PulseError::ValidationError(format!(
                    "empty answer for question {}",
                    answer.question_id
                )));
            }
        }

        // All-or-nothing: one transaction for the whole batch.
        let tx = conn.unchecked_transaction()?;
        for answer in answers {
            tx.execute(
                "INSERT INTO survey_responses(employee_id, form_id, question_id, answer, submitted_at)
                 VALUES(?1, ?2, ?3, ?4, ?5)",
                params![employee_id, form_id, answer.question_id, answer.answer, ts],
            )?;
        }
        tx.commit()?;
        Ok(employee.company_id)
    })?;

    // Follow-up flag update. Answers are already committed; a failure here
    // is an operator warning, not a submission failure.
    let filled_flag_set = match broker.with_conn(
        &db_path,
        &caller.actor_label(),
        "survey.mark_filled",
        |conn| {
            conn.execute(
                "UPDATE employees SET filled = 1 WHERE id = ?1",
                params![employee_id],
            )?;
            Ok(())
        },
    ) {
        Ok(()) => true,
        Err(e) => {
            let _ = broker.record_audit_event(
                &caller.actor_label(),
                "survey.filled_flag_update_failed",
                crate::core::schemas::PULSE_DB_NAME,
                "warning",
                Some(format!("employee {employee_id}: {e}")),
            );
            false
        }
    };

    let completion = broker.with_read_conn(&db_path, |conn| {
        completion::completion_status(conn, company_id)
    })?;

    Ok(SubmitOutcome {
        employee_id,
        company_id,
        form_id,
        answers_saved: answers.len(),
        filled_flag_set,
        completion,
        analysis_due: completion.complete,
    })
}

pub fn submission_status(
    store: &Store,
    caller: &Caller,
    employee_id: i64,
) -> Result<(directory::Employee, bool), error::PulseError> {
    let broker = DbBroker::new(&store.root);
    broker.with_read_conn(&db::pulse_db_path(&store.root), |conn| {
        let employee = directory::get_employee(conn, employee_id)?;
        guard::ensure_self_or_management(caller, employee_id, employee.company_id)?;
        let filled = employee.filled;
        Ok((employee, filled))
    })
}

pub fn company_status(
    store: &Store,
    caller: &Caller,
    company_ref: &str,
) -> Result<CompanyStatus, error::PulseError> {
    let broker = DbBroker::new(&store.root);
    broker.with_read_conn(&db::pulse_db_path(&store.root), |conn| {
        let company = directory::resolve_company(conn, company_ref)?;
        guard::ensure_management(caller, company.id)?;
        let completion = completion::completion_status(conn, company.id)?;
        let missing = completion::missing_employees(conn, company.id)?;
        Ok(CompanyStatus {
            company_id: company.id,
            company_name: company.name,
            completion,
            missing,
        })
    })
}

fn form_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Form> {
    Ok(Form {
        id: row.get(0)?,
        title: row.get(1)?,
        created_at: row.get(2)?,
    })
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "survey",
        "version": "0.1.0",
        "description": "Survey forms, atomic submissions, completion status",
        "commands": [
            { "name": "form seed", "description": "Seed the built-in questionnaire" },
            { "name": "survey submit", "description": "Submit an answer batch" },
            { "name": "survey status", "description": "Per-employee submission status" },
            { "name": "survey company", "description": "Company completion status" }
        ],
        "storage": ["pulse.db"]
    })
}
