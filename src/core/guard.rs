//! Access guard: caller identity resolution and tenant isolation.
//!
//! Every read or mutation that targets an employee or company resolves the
//! caller's own company and the target's company, and rejects unless they
//! match. Role `admin` is the superuser and may target any company; the
//! built-in `root` actor stands in for the operator before any admin row
//! exists. The credential collaborator supplies the actor string; this core
//! never verifies credentials.

use crate::core::error::PulseError;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Manager,
    Hr,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Manager => "manager",
            Role::Hr => "hr",
            Role::Admin => "admin",
        }
    }

    /// Management roles may operate on company-wide surfaces.
    pub fn is_management(self) -> bool {
        matches!(self, Role::Manager | Role::Hr | Role::Admin)
    }
}

impl FromStr for Role {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "employee" => Ok(Role::Employee),
            "manager" => Ok(Role::Manager),
            "hr" => Ok(Role::Hr),
            "admin" => Ok(Role::Admin),
            other => Err(PulseError::ValidationError(format!(
                "unknown role: {other} (expected employee|manager|hr|admin)"
            ))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved caller identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Caller {
    /// Built-in operator identity, outside any tenant.
    Root,
    Employee {
        employee_id: i64,
        company_id: i64,
        role: Role,
    },
}

impl Caller {
    pub fn actor_label(&self) -> String {
        match self {
            Caller::Root => "root".to_string(),
            Caller::Employee { employee_id, .. } => format!("employee:{employee_id}"),
        }
    }

    pub fn is_superuser(&self) -> bool {
        matches!(self, Caller::Root)
            || matches!(
                self,
                Caller::Employee {
                    role: Role::Admin,
                    ..
                }
            )
    }
}

/// Resolves an actor string (`root` or an employee id) to a caller.
pub fn resolve_actor(conn: &Connection, actor: &str) -> Result<Caller, PulseError> {
    let actor = actor.trim();
    if actor.is_empty() {
        return Err(PulseError::ValidationError("actor must not be empty".into()));
    }
    if actor == "root" {
        return Ok(Caller::Root);
    }
    let employee_id: i64 = actor.parse().map_err(|_| {
        PulseError::ValidationError(format!(
            "actor must be 'root' or an employee id, got: {actor}"
        ))
    })?;
    let row = conn
        .query_row(
            "SELECT company_id, role FROM employees WHERE id = ?1",
            params![employee_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                ))
            },
        )
        .optional()?;
    let (company_id, role_str) =
        row.ok_or_else(|| PulseError::NotFound(format!("employee {employee_id}")))?;
    Ok(Caller::Employee {
        employee_id,
        company_id,
        role: role_str.parse()?,
    })
}

/// Tenant isolation: the caller may only touch its own company.
pub fn ensure_same_company(caller: &Caller, target_company_id: i64) -> Result<(), PulseError> {
    if caller.is_superuser() {
        return Ok(());
    }
    match caller {
        Caller::Employee { company_id, .. } if *company_id == target_company_id => Ok(()),
        _ => Err(PulseError::Forbidden(format!(
            "{} may not access company {target_company_id}",
            caller.actor_label()
        ))),
    }
}

/// Company-wide surfaces (status, reports, reset, analysis) need a
/// management role on top of tenant isolation.
pub fn ensure_management(caller: &Caller, target_company_id: i64) -> Result<(), PulseError> {
    ensure_same_company(caller, target_company_id)?;
    match caller {
        Caller::Root => Ok(()),
        Caller::Employee { role, .. } if role.is_management() => Ok(()),
        Caller::Employee { .. } => Err(PulseError::Forbidden(format!(
            "{} lacks a management role for company {target_company_id}",
            caller.actor_label()
        ))),
    }
}

/// Employee-scoped reads: the employee themself, or management of the same
/// company.
pub fn ensure_self_or_management(
    caller: &Caller,
    target_employee_id: i64,
    target_company_id: i64,
) -> Result<(), PulseError> {
    match caller {
        Caller::Employee { employee_id, .. } if *employee_id == target_employee_id => {
            ensure_same_company(caller, target_company_id)
        }
        _ => ensure_management(caller, target_company_id),
    }
}
