//! Centralized database schema definitions for the Pulsecheck consolidated bin.
//!
//! Pulsecheck keeps all survey state in one SQLite database (`pulse.db`) so
//! that the reset lifecycle can clear responses, reports and flags in a
//! single transaction:
//! 1. Tenant directory: companies and employees (the unit of isolation).
//! 2. Survey: forms, questions, and submitted responses.
//! 3. Reports: per-employee and per-company analysis artifacts.
//! 4. Analysis runs: the orchestration status store and in-flight markers.

pub const PULSE_DB_NAME: &str = "pulse.db";
pub const PULSE_EVENTS_NAME: &str = "pulse.events.jsonl";

// --- 1. Tenant Directory ---

pub const DIRECTORY_DB_SCHEMA_COMPANIES: &str = "
    CREATE TABLE IF NOT EXISTS companies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    )
";

pub const DIRECTORY_DB_SCHEMA_EMPLOYEES: &str = "
    CREATE TABLE IF NOT EXISTS employees (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        company_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        role TEXT NOT NULL DEFAULT 'employee',
        filled INTEGER NOT NULL DEFAULT 0,
        credential_state TEXT NOT NULL DEFAULT 'pending',
        created_at TEXT NOT NULL,
        FOREIGN KEY(company_id) REFERENCES companies(id)
    )
";

pub const DIRECTORY_DB_INDEX_EMPLOYEES_COMPANY: &str =
    "CREATE INDEX IF NOT EXISTS idx_employees_company ON employees(company_id)";
pub const DIRECTORY_DB_INDEX_EMPLOYEES_COMPANY_ROLE: &str =
    "CREATE INDEX IF NOT EXISTS idx_employees_company_role ON employees(company_id, role)";

// --- 2. Survey ---

pub const SURVEY_DB_SCHEMA_FORMS: &str = "
    CREATE TABLE IF NOT EXISTS forms (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    )
";

pub const SURVEY_DB_SCHEMA_QUESTIONS: &str = "
    CREATE TABLE IF NOT EXISTS questions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        form_id INTEGER NOT NULL,
        position INTEGER NOT NULL,
        prompt TEXT NOT NULL,
        UNIQUE(form_id, position),
        FOREIGN KEY(form_id) REFERENCES forms(id)
    )
";

pub const SURVEY_DB_SCHEMA_RESPONSES: &str = "
    CREATE TABLE IF NOT EXISTS survey_responses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL,
        form_id INTEGER NOT NULL,
        question_id INTEGER NOT NULL,
        answer TEXT NOT NULL,
        submitted_at TEXT NOT NULL,
        UNIQUE(employee_id, question_id),
        FOREIGN KEY(employee_id) REFERENCES employees(id),
        FOREIGN KEY(form_id) REFERENCES forms(id),
        FOREIGN KEY(question_id) REFERENCES questions(id)
    )
";

pub const SURVEY_DB_INDEX_RESPONSES_EMPLOYEE: &str =
    "CREATE INDEX IF NOT EXISTS idx_responses_employee ON survey_responses(employee_id)";
pub const SURVEY_DB_INDEX_QUESTIONS_FORM: &str =
    "CREATE INDEX IF NOT EXISTS idx_questions_form ON questions(form_id)";

// --- 3. Reports ---

pub const REPORT_DB_SCHEMA_INDIVIDUAL: &str = "
    CREATE TABLE IF NOT EXISTS individual_reports (
        id TEXT PRIMARY KEY,
        employee_id INTEGER NOT NULL,
        payload TEXT NOT NULL,
        content_hash TEXT NOT NULL,
        created_at TEXT NOT NULL,
        FOREIGN KEY(employee_id) REFERENCES employees(id)
    )
";

pub const REPORT_DB_SCHEMA_COMPANY: &str = "
    CREATE TABLE IF NOT EXISTS company_reports (
        id TEXT PRIMARY KEY,
        company_id INTEGER NOT NULL,
        payload TEXT NOT NULL,
        content_hash TEXT NOT NULL,
        created_at TEXT NOT NULL,
        FOREIGN KEY(company_id) REFERENCES companies(id)
    )
";

pub const REPORT_DB_INDEX_INDIVIDUAL_EMPLOYEE: &str =
    "CREATE INDEX IF NOT EXISTS idx_individual_reports_employee ON individual_reports(employee_id, created_at)";
pub const REPORT_DB_INDEX_COMPANY_COMPANY: &str =
    "CREATE INDEX IF NOT EXISTS idx_company_reports_company ON company_reports(company_id, created_at)";

// --- 4. Analysis runs (status store + in-flight markers) ---

pub const ANALYSIS_DB_SCHEMA_RUNS: &str = "
    CREATE TABLE IF NOT EXISTS analysis_runs (
        id TEXT PRIMARY KEY,
        company_id INTEGER NOT NULL,
        trigger_kind TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'running', -- running | succeeded | failed
        started_at TEXT NOT NULL,
        finished_at TEXT,
        summary TEXT, -- JSON blob with phase counts and failure details
        FOREIGN KEY(company_id) REFERENCES companies(id)
    )
";

pub const ANALYSIS_DB_SCHEMA_RUN_EVENTS: &str = "
    CREATE TABLE IF NOT EXISTS analysis_run_events (
        event_id TEXT PRIMARY KEY,
        run_id TEXT NOT NULL,
        ts TEXT NOT NULL,
        kind TEXT NOT NULL,
        detail TEXT NOT NULL,
        FOREIGN KEY(run_id) REFERENCES analysis_runs(id) ON DELETE CASCADE
    )
";

pub const ANALYSIS_DB_INDEX_RUNS_COMPANY: &str =
    "CREATE INDEX IF NOT EXISTS idx_analysis_runs_company ON analysis_runs(company_id, started_at)";
pub const ANALYSIS_DB_INDEX_RUNS_STATUS: &str =
    "CREATE INDEX IF NOT EXISTS idx_analysis_runs_status ON analysis_runs(company_id, status)";
pub const ANALYSIS_DB_INDEX_RUN_EVENTS_RUN: &str =
    "CREATE INDEX IF NOT EXISTS idx_analysis_run_events_run ON analysis_run_events(run_id)";

/// Every DDL statement for `pulse.db`, in dependency order.
pub const PULSE_DB_ALL: &[&str] = &[
    DIRECTORY_DB_SCHEMA_COMPANIES,
    DIRECTORY_DB_SCHEMA_EMPLOYEES,
    DIRECTORY_DB_INDEX_EMPLOYEES_COMPANY,
    DIRECTORY_DB_INDEX_EMPLOYEES_COMPANY_ROLE,
    SURVEY_DB_SCHEMA_FORMS,
    SURVEY_DB_SCHEMA_QUESTIONS,
    SURVEY_DB_SCHEMA_RESPONSES,
    SURVEY_DB_INDEX_RESPONSES_EMPLOYEE,
    SURVEY_DB_INDEX_QUESTIONS_FORM,
    REPORT_DB_SCHEMA_INDIVIDUAL,
    REPORT_DB_SCHEMA_COMPANY,
    REPORT_DB_INDEX_INDIVIDUAL_EMPLOYEE,
    REPORT_DB_INDEX_COMPANY_COMPANY,
    ANALYSIS_DB_SCHEMA_RUNS,
    ANALYSIS_DB_SCHEMA_RUN_EVENTS,
    ANALYSIS_DB_INDEX_RUNS_COMPANY,
    ANALYSIS_DB_INDEX_RUNS_STATUS,
    ANALYSIS_DB_INDEX_RUN_EVENTS_RUN,
];
