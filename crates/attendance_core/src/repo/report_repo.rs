//! Read-only report queries joining roster and ledger.
//!
//! # Responsibility
//! - Shape per-student and per-date attendance reports.
//! - Produce export rows in fixed column order for external writers.
//!
//! # Invariants
//! - Reports are inner joins: only stored marks produce rows.
//! - Per-student rows are ordered by `date ASC`.
//! - Per-date rows are ordered by `class_label ASC, roll_no ASC`.
//! - Attendance export rows are ordered by `date, class_label, roll_no`.

use crate::model::attendance::{AttendanceDate, AttendanceRecordId, AttendanceStatus};
use crate::model::student::StudentId;
use crate::repo::attendance_repo::parse_status;
use crate::repo::student_repo::{RepoError, RepoResult};
use crate::repo::{ensure_connection_ready, student_exists};
use crate::repo::{ATTENDANCE_TABLE, STUDENTS_TABLE};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use serde::Serialize;

const REPORT_SELECT_SQL: &str = "SELECT
    s.roll_no AS roll_no,
    s.name AS name,
    a.date AS date,
    a.status AS status
FROM attendance a
INNER JOIN students s ON s.id = a.student_id";

/// One line of a by-student or by-date report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub roll_no: String,
    pub name: String,
    pub date: AttendanceDate,
    pub status: AttendanceStatus,
}

/// Students export line: `[id, roll_no, name, class_label]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentExportRow {
    pub id: StudentId,
    pub roll_no: String,
    pub name: String,
    pub class_label: String,
}

/// Attendance export line: `[id, roll_no, name, class_label, date, status]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceExportRow {
    pub id: AttendanceRecordId,
    pub roll_no: String,
    pub name: String,
    pub class_label: String,
    pub date: AttendanceDate,
    pub status: AttendanceStatus,
}

/// Repository interface for report and export queries.
pub trait ReportRepository {
    /// Returns whether the student exists in the roster.
    fn has_student(&self, student_id: StudentId) -> RepoResult<bool>;
    /// Marks of one student, oldest first.
    fn rows_for_student(&self, student_id: StudentId) -> RepoResult<Vec<ReportRow>>;
    /// Marks stored for one day, in roster order.
    fn rows_for_date(&self, date: AttendanceDate) -> RepoResult<Vec<ReportRow>>;
    /// Whole roster ordered by id.
    fn export_students(&self) -> RepoResult<Vec<StudentExportRow>>;
    /// Whole ledger joined with roster fields.
    fn export_attendance(&self) -> RepoResult<Vec<AttendanceExportRow>>;
}

/// SQLite-backed report repository.
pub struct SqliteReportRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReportRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[STUDENTS_TABLE, ATTENDANCE_TABLE])?;
        Ok(Self { conn })
    }

    fn query_report(&self, filter_sql: &str, bind: Value) -> RepoResult<Vec<ReportRow>> {
        let mut stmt = self.conn.prepare(&format!("{REPORT_SELECT_SQL} {filter_sql}"))?;
        let mut rows = stmt.query(params_from_iter([bind]))?;
        let mut report = Vec::new();
        while let Some(row) = rows.next()? {
            report.push(ReportRow {
                roll_no: row.get("roll_no")?,
                name: row.get("name")?,
                date: parse_date_column(row)?,
                status: parse_status(&row.get::<_, String>("status")?)?,
            });
        }
        Ok(report)
    }
}

impl ReportRepository for SqliteReportRepository<'_> {
    fn has_student(&self, student_id: StudentId) -> RepoResult<bool> {
        student_exists(self.conn, student_id)
    }

    fn rows_for_student(&self, student_id: StudentId) -> RepoResult<Vec<ReportRow>> {
        self.query_report(
            "WHERE s.id = ?1 ORDER BY a.date ASC;",
            Value::Integer(student_id),
        )
    }

    fn rows_for_date(&self, date: AttendanceDate) -> RepoResult<Vec<ReportRow>> {
        self.query_report(
            "WHERE a.date = ?1 ORDER BY s.class_label ASC, s.roll_no ASC;",
            Value::Text(date.to_db_string()),
        )
    }

    fn export_students(&self) -> RepoResult<Vec<StudentExportRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, roll_no, name, class_label
             FROM students
             ORDER BY id ASC;",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(StudentExportRow {
                    id: row.get("id")?,
                    roll_no: row.get("roll_no")?,
                    name: row.get("name")?,
                    class_label: row.get("class_label")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn export_attendance(&self) -> RepoResult<Vec<AttendanceExportRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                a.id AS id,
                s.roll_no AS roll_no,
                s.name AS name,
                s.class_label AS class_label,
                a.date AS date,
                a.status AS status
             FROM attendance a
             INNER JOIN students s ON s.id = a.student_id
             ORDER BY a.date ASC, s.class_label ASC, s.roll_no ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut export = Vec::new();
        while let Some(row) = rows.next()? {
            export.push(AttendanceExportRow {
                id: row.get("id")?,
                roll_no: row.get("roll_no")?,
                name: row.get("name")?,
                class_label: row.get("class_label")?,
                date: parse_date_column(row)?,
                status: parse_status(&row.get::<_, String>("status")?)?,
            });
        }
        Ok(export)
    }
}

fn parse_date_column(row: &Row<'_>) -> RepoResult<AttendanceDate> {
    let value: String = row.get("date")?;
    AttendanceDate::parse(&value)
        .map_err(|_| RepoError::InvalidData(format!("invalid date `{value}` in attendance.date")))
}
