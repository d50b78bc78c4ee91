//! Core data and query logic for the student attendance register.
//! This crate is the single source of truth for roster and ledger invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::attendance::{
    AttendanceDate, AttendanceRecord, AttendanceRecordId, AttendanceStatus, InvalidDateError,
};
pub use model::student::{Student, StudentFields, StudentId, StudentValidationError};
pub use repo::attendance_repo::{AttendanceRepository, SheetEntry, SqliteAttendanceRepository};
pub use repo::report_repo::{
    AttendanceExportRow, ReportRepository, ReportRow, SqliteReportRepository, StudentExportRow,
};
pub use repo::student_repo::{
    ErrorKind, RepoError, RepoResult, SqliteStudentRepository, StudentRepository,
};
pub use service::attendance_service::AttendanceService;
pub use service::report_service::{
    ExportScope, ExportTable, ReportFilter, ReportService, UnknownExportScope,
    ATTENDANCE_EXPORT_COLUMNS, STUDENT_EXPORT_COLUMNS,
};
pub use service::roster_service::RosterService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
