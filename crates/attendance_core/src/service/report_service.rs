//! Report and export use-case service.
//!
//! # Responsibility
//! - Answer by-student and by-date report requests.
//! - Hand export rows to external writers in a fixed column layout.
//!
//! # Invariants
//! - Read-only: never mutates roster or ledger.
//! - Unmarked students/dates are omitted, never reported as `Absent`.
//! - Core performs no file I/O for exports.

use crate::model::attendance::AttendanceDate;
use crate::model::student::StudentId;
use crate::repo::report_repo::{AttendanceExportRow, ReportRepository, ReportRow, StudentExportRow};
use crate::repo::student_repo::{RepoError, RepoResult};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Column layout of the students export.
pub const STUDENT_EXPORT_COLUMNS: &[&str] = &["id", "roll_no", "name", "class_label"];

/// Column layout of the attendance export.
pub const ATTENDANCE_EXPORT_COLUMNS: &[&str] =
    &["id", "roll_no", "name", "class_label", "date", "status"];

/// Report selector mirroring the presentation filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportFilter {
    ByStudent(StudentId),
    /// Raw date input; validated when the report runs.
    ByDate(String),
}

/// Table chosen for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportScope {
    Students,
    Attendance,
}

impl ExportScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Attendance => "attendance",
        }
    }

    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Students => STUDENT_EXPORT_COLUMNS,
            Self::Attendance => ATTENDANCE_EXPORT_COLUMNS,
        }
    }
}

/// Scope text other than `students` or `attendance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownExportScope(pub String);

impl Display for UnknownExportScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown export scope `{}`; expected students|attendance",
            self.0
        )
    }
}

impl std::error::Error for UnknownExportScope {}

impl FromStr for ExportScope {
    type Err = UnknownExportScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "students" => Ok(Self::Students),
            "attendance" => Ok(Self::Attendance),
            _ => Err(UnknownExportScope(s.to_string())),
        }
    }
}

/// Export payload: fixed header plus stringly-typed cells for any writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportTable {
    pub scope: ExportScope,
    pub columns: &'static [&'static str],
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    fn from_students(rows: Vec<StudentExportRow>) -> Self {
        Self {
            scope: ExportScope::Students,
            columns: ExportScope::Students.columns(),
            rows: rows
                .into_iter()
                .map(|row| vec![row.id.to_string(), row.roll_no, row.name, row.class_label])
                .collect(),
        }
    }

    fn from_attendance(rows: Vec<AttendanceExportRow>) -> Self {
        Self {
            scope: ExportScope::Attendance,
            columns: ExportScope::Attendance.columns(),
            rows: rows
                .into_iter()
                .map(|row| {
                    vec![
                        row.id.to_string(),
                        row.roll_no,
                        row.name,
                        row.class_label,
                        row.date.to_db_string(),
                        row.status.as_str().to_string(),
                    ]
                })
                .collect(),
        }
    }
}

/// Report service facade over repository implementations.
pub struct ReportService<R: ReportRepository> {
    repo: R,
}

impl<R: ReportRepository> ReportService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// All marks of one student ordered by date.
    ///
    /// Fails with `RepoError::StudentNotFound` for unknown ids; a known student
    /// with no marks yields an empty report.
    pub fn report_by_student(&self, student_id: StudentId) -> RepoResult<Vec<ReportRow>> {
        if !self.repo.has_student(student_id)? {
            return Err(RepoError::StudentNotFound(student_id));
        }
        self.repo.rows_for_student(student_id)
    }

    /// All marks stored for one day ordered by class, then roll number.
    pub fn report_by_date(&self, date: &str) -> RepoResult<Vec<ReportRow>> {
        let date = AttendanceDate::parse(date)?;
        self.repo.rows_for_date(date)
    }

    /// Runs the report selected by `filter`.
    pub fn report(&self, filter: &ReportFilter) -> RepoResult<Vec<ReportRow>> {
        match filter {
            ReportFilter::ByStudent(student_id) => self.report_by_student(*student_id),
            ReportFilter::ByDate(date) => self.report_by_date(date),
        }
    }

    /// Builds export rows for the chosen table.
    pub fn export_rows(&self, scope: ExportScope) -> RepoResult<ExportTable> {
        match scope {
            ExportScope::Students => Ok(ExportTable::from_students(self.repo.export_students()?)),
            ExportScope::Attendance => Ok(ExportTable::from_attendance(
                self.repo.export_attendance()?,
            )),
        }
    }
}
