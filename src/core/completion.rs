//! Company completion detection.
//!
//! The single shared predicate behind both the post-submission trigger and
//! every status surface. Computed from one SQL aggregate so no employee can
//! be counted in `total` without its `filled` flag being part of the same
//! read.

use crate::core::error::PulseError;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

pub const HR_ROLE: &str = "hr";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionStatus {
    /// Non-HR employees of the company.
    pub total: i64,
    /// Of those, how many have submitted.
    pub filled: i64,
    pub complete: bool,
}

/// Computes the completion state for a company in one consistent read.
///
/// A company with zero eligible employees is never complete: there is
/// nothing to report.
pub fn completion_status(
    conn: &Connection,
    company_id: i64,
) -> Result<CompletionStatus, PulseError> {
    let (total, filled): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(filled), 0)
         FROM employees
         WHERE company_id = ?1 AND role != ?2",
        params![company_id, HR_ROLE],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(CompletionStatus {
        total,
        filled,
        complete: total > 0 && filled == total,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingEmployee {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Not-yet-filled non-HR employees, for the company status surface.
pub fn missing_employees(
    conn: &Connection,
    company_id: i64,
) -> Result<Vec<MissingEmployee>, PulseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email FROM employees
         WHERE company_id = ?1 AND role != ?2 AND filled = 0
         ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![company_id, HR_ROLE], |row| {
            Ok(MissingEmployee {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Non-HR employees with `filled = 1`, the phase-1 population.
pub fn filled_employee_ids(conn: &Connection, company_id: i64) -> Result<Vec<i64>, PulseError> {
    let mut stmt = conn.prepare(
        "SELECT id FROM employees
         WHERE company_id = ?1 AND role != ?2 AND filled = 1
         ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![company_id, HR_ROLE], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
