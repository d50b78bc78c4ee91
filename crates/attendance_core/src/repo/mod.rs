//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for roster, ledger and
//!   report queries.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate input before any SQL mutation.
//! - Multi-statement writes run inside one `IMMEDIATE` transaction.
//! - Repository APIs return semantic errors (`StudentNotFound`,
//!   `DuplicateRollNumber`) in addition to DB transport errors.

pub mod attendance_repo;
pub mod report_repo;
pub mod student_repo;

use crate::db::migrations::latest_version;
use crate::model::student::StudentId;
use rusqlite::{ffi, Connection};
use student_repo::{RepoError, RepoResult};

/// Table plus the columns a repository reads or writes.
pub(crate) struct TableRequirement {
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

pub(crate) const STUDENTS_TABLE: TableRequirement = TableRequirement {
    table: "students",
    columns: &["id", "roll_no", "name", "class_label"],
};

pub(crate) const ATTENDANCE_TABLE: TableRequirement = TableRequirement {
    table: "attendance",
    columns: &["id", "student_id", "date", "status"],
};

/// Rejects connections that were not opened through `db::open_db*`.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    requirements: &[TableRequirement],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for requirement in requirements {
        if !table_exists(conn, requirement.table)? {
            return Err(RepoError::MissingRequiredTable(requirement.table));
        }
        for column in requirement.columns {
            if !table_has_column(conn, requirement.table, column)? {
                return Err(RepoError::MissingRequiredColumn {
                    table: requirement.table,
                    column: *column,
                });
            }
        }
    }

    Ok(())
}

/// Returns true for `UNIQUE`/`PRIMARY KEY` constraint failures.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => matches!(
            failure.extended_code,
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        ),
        _ => false,
    }
}

pub(crate) fn student_exists(conn: &Connection, student_id: StudentId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM students WHERE id = ?1);",
        [student_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
