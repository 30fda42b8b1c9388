//! Tenant directory: companies and employees.
//!
//! The company is the unit of data isolation; every other record hangs off
//! it. Company lookup accepts a numeric id or the unique name, and an
//! unknown reference is a hard `NotFound`, never a silently-empty result.

use crate::core::broker::DbBroker;
use crate::core::db;
use crate::core::error;
use crate::core::guard::{self, Caller, Role};
use crate::core::store::Store;
use crate::core::time;
use clap::{Parser, Subcommand};
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Employee {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub filled: bool,
    pub credential_state: String,
    pub created_at: String,
}

/// Row shape accepted by `employee import` (the JSON contract with the
/// spreadsheet collaborator; parsing the spreadsheet itself lives outside).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImportEmployeeRow {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Parser, Debug)]
#[clap(name = "company", about = "Manage client companies")]
pub struct CompanyCli {
    #[clap(subcommand)]
    pub command: CompanyCommand,
}

#[derive(Subcommand, Debug)]
pub enum CompanyCommand {
    /// Register a new client company.
    Add {
        #[clap(long)]
        name: String,
    },
    /// List all companies (superuser only).
    List,
}

#[derive(Parser, Debug)]
#[clap(name = "employee", about = "Manage company employees")]
pub struct EmployeeCli {
    #[clap(subcommand)]
    pub command: EmployeeCommand,
}

#[derive(Subcommand, Debug)]
pub enum EmployeeCommand {
    /// Add one employee to a company.
    Add {
        /// Company id or unique name.
        #[clap(long)]
        company: String,
        #[clap(long)]
        name: String,
        #[clap(long)]
        email: String,
        #[clap(long, default_value = "employee")]
        role: String,
    },
    /// List a company's employees.
    List {
        #[clap(long)]
        company: String,
    },
    /// Bulk-import employees from a JSON array file.
    Import {
        #[clap(long)]
        company: String,
        /// Path to a JSON array of {name, email, role?} rows.
        #[clap(long)]
        file: String,
    },
}

pub fn run_company_cli(
    store: &Store,
    cli: CompanyCli,
    caller: &Caller,
) -> Result<(), error::PulseError> {
    match cli.command {
        CompanyCommand::Add { name } => {
            let company = add_company(store, caller, &name)?;
            println!(
                "{}",
                time::command_envelope(
                    "company.add",
                    "ok",
                    serde_json::json!({ "id": company.id, "name": company.name })
                )
            );
        }
        CompanyCommand::List => {
            let companies = list_companies(store, caller)?;
            println!(
                "{}",
                time::command_envelope(
                    "company.list",
                    "ok",
                    serde_json::json!({ "companies": companies })
                )
            );
        }
    }
    Ok(())
}

pub fn run_employee_cli(
    store: &Store,
    cli: EmployeeCli,
    caller: &Caller,
) -> Result<(), error::PulseError> {
    match cli.command {
        EmployeeCommand::Add {
            company,
            name,
            email,
            role,
        } => {
            let employee = add_employee(store, caller, &company, &name, &email, &role)?;
            println!(
                "{}",
                time::command_envelope(
                    "employee.add",
                    "ok",
                    serde_json::json!({
                        "id": employee.id,
                        "company_id": employee.company_id,
                        "email": employee.email,
                        "role": employee.role
                    })
                )
            );
        }
        EmployeeCommand::List { company } => {
            let employees = list_employees(store, caller, &company)?;
            println!(
                "{}",
                time::command_envelope(
                    "employee.list",
                    "ok",
                    serde_json::json!({ "employees": employees })
                )
            );
        }
        EmployeeCommand::Import { company, file } => {
            let content = std::fs::read_to_string(&file).map_err(error::PulseError::IoError)?;
            let rows: Vec<ImportEmployeeRow> = serde_json::from_str(&content)
                .map_err(|e| error::PulseError::ValidationError(format!("import file: {e}")))?;
            let imported = import_employees(store, caller, &company, &rows)?;
            println!(
                "{}",
                time::command_envelope(
                    "employee.import",
                    "ok",
                    serde_json::json!({ "imported": imported })
                )
            );
        }
    }
    Ok(())
}

/// Resolves a company reference: numeric id first, unique name otherwise.
pub fn resolve_company(conn: &Connection, reference: &str) -> Result<Company, error::PulseError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(error::PulseError::ValidationError(
            "company reference must not be empty".into(),
        ));
    }
    let row = if let Ok(id) = reference.parse::<i64>() {
        conn.query_row(
            "SELECT id, name, created_at FROM companies WHERE id = ?1",
            params![id],
            company_from_row,
        )
        .optional()?
    } else {
        conn.query_row(
            "SELECT id, name, created_at FROM companies WHERE name = ?1",
            params![reference],
            company_from_row,
        )
        .optional()?
    };
    row.ok_or_else(|| error::PulseError::NotFound(format!("company {reference}")))
}

pub fn get_employee(conn: &Connection, employee_id: i64) -> Result<Employee, error::PulseError> {
    conn.query_row(
        "SELECT id, company_id, name, email, role, filled, credential_state, created_at
         FROM employees WHERE id = ?1",
        params![employee_id],
        employee_from_row,
    )
    .optional()?
    .ok_or_else(|| error::PulseError::NotFound(format!("employee {employee_id}")))
}

pub fn add_company(
    store: &Store,
    caller: &Caller,
    name: &str,
) -> Result<Company, error::PulseError> {
    if !caller.is_superuser() {
        return Err(error::PulseError::Forbidden(
            "only an administrator may register companies".into(),
        ));
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(error::PulseError::ValidationError(
            "company name must not be empty".into(),
        ));
    }
    let ts = time::now_epoch_z();
    let broker = DbBroker::new(&store.root);
    let db_path = db::pulse_db_path(&store.root);
    broker.with_conn(&db_path, &caller.actor_label(), "company.add", |conn| {
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM companies WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(error::PulseError::Conflict(format!(
                "company name already registered: {name}"
            )));
        }
        conn.execute(
            "INSERT INTO companies(name, created_at) VALUES(?1, ?2)",
            params![name, ts],
        )?;
        Ok(Company {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            created_at: ts.clone(),
        })
    })
}

pub fn list_companies(store: &Store, caller: &Caller) -> Result<Vec<Company>, error::PulseError> {
    if !caller.is_superuser() {
        return Err(error::PulseError::Forbidden(
            "company listing is cross-tenant".into(),
        ));
    }
    let broker = DbBroker::new(&store.root);
    broker.with_read_conn(&db::pulse_db_path(&store.root), |conn| {
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM companies ORDER BY id")?;
        let rows = stmt
            .query_map([], company_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

pub fn add_employee(
    store: &Store,
    caller: &Caller,
    company_ref: &str,
    name: &str,
    email: &str,
    role: &str,
) -> Result<Employee, error::PulseError> {
    let role: Role = role.parse()?;
    validate_employee_fields(name, email)?;
    let ts = time::now_epoch_z();
    let broker = DbBroker::new(&store.root);
    let db_path = db::pulse_db_path(&store.root);
    broker.with_conn(&db_path, &caller.actor_label(), "employee.add", |conn| {
        let company = resolve_company(conn, company_ref)?;
        guard::ensure_management(caller, company.id)?;
        insert_employee(conn, company.id, name, email, role, &ts)
    })
}

pub fn list_employees(
    store: &Store,
    caller: &Caller,
    company_ref: &str,
) -> Result<Vec<Employee>, error::PulseError> {
    let broker = DbBroker::new(&store.root);
    broker.with_read_conn(&db::pulse_db_path(&store.root), |conn| {
        let company = resolve_company(conn, company_ref)?;
        guard::ensure_management(caller, company.id)?;
        let mut stmt = conn.prepare(
            "SELECT id, company_id, name, email, role, filled, credential_state, created_at
             FROM employees WHERE company_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![company.id], employee_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Imports a batch of employees in one transaction: a bad row rejects the
/// whole file so a partial roster never goes live.
pub fn import_employees(
    store: &Store,
    caller: &Caller,
    company_ref: &str,
    rows: &[ImportEmployeeRow],
) -> Result<usize, error::PulseError> {
    if rows.is_empty() {
        return Err(error::PulseError::ValidationError(
            "import file contains no rows".into(),
        ));
    }
    for row in rows {
        validate_employee_fields(&row.name, &row.email)?;
    }
    let ts = time::now_epoch_z();
    let broker = DbBroker::new(&store.root);
    let db_path = db::pulse_db_path(&store.root);
    broker.with_conn(&db_path, &caller.actor_label(), "employee.import", |conn| {
        let company = resolve_company(conn, company_ref)?;
        guard::ensure_management(caller, company.id)?;
        let tx = conn.unchecked_transaction()?;
        let mut imported = 0usize;
        for row in rows {
            let role: Role = row.role.as_deref().unwrap_or("employee").parse()?;
            insert_employee(&tx, company.id, &row.name, &row.email, role, &ts)?;
            imported += 1;
        }
        tx.commit()?;
        Ok(imported)
    })
}

fn insert_employee(
    conn: &Connection,
    company_id: i64,
    name: &str,
    email: &str,
    role: Role,
    ts: &str,
) -> Result<Employee, error::PulseError> {
    let email = email.trim().to_ascii_lowercase();
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM employees WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )
        .optional()?;
    if existing.is_some() {
        return Err(error::PulseError::Conflict(format!(
            "email already registered: {email}"
        )));
    }
    conn.execute(
        "INSERT INTO employees(company_id, name, email, role, filled, credential_state, created_at)
         VALUES(?1, ?2, ?3, ?4, 0, 'pending', ?5)",
        params![company_id, name.trim(), email, role.as_str(), ts],
    )?;
    Ok(Employee {
        id: conn.last_insert_rowid(),
        company_id,
        name: name.trim().to_string(),
        email,
        role,
        filled: false,
        credential_state: "pending".to_string(),
        created_at: ts.to_string(),
    })
}

fn validate_employee_fields(name: &str, email: &str) -> Result<(), error::PulseError> {
    if name.trim().is_empty() {
        return Err(error::PulseError::ValidationError(
            "employee name must not be empty".into(),
        ));
    }
    let email_re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .map_err(|e| error::PulseError::ValidationError(e.to_string()))?;
    if !email_re.is_match(email.trim()) {
        return Err(error::PulseError::ValidationError(format!(
            "invalid email address: {email}"
        )));
    }
    Ok(())
}

fn company_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Company> {
    Ok(Company {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
    })
}

fn employee_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Employee> {
    let role_str: String = row.get(4)?;
    let role = role_str.parse::<Role>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let filled: i64 = row.get(5)?;
    Ok(Employee {
        id: row.get(0)?,
        company_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        role,
        filled: filled != 0,
        credential_state: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "directory",
        "version": "0.1.0",
        "description": "Tenant directory: companies and employees",
        "commands": [
            { "name": "company add", "description": "Register a client company" },
            { "name": "company list", "description": "List companies (superuser)" },
            { "name": "employee add", "description": "Add an employee" },
            { "name": "employee list", "description": "List a company's employees" },
            { "name": "employee import", "description": "Bulk-import employees from JSON" }
        ],
        "storage": ["pulse.db"]
    })
}
