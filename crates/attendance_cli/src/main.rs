//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `attendance_core` linkage and database bootstrap.
//! - Print a one-line roster/ledger summary for quick local sanity checks.
//!
//! Reads `ATTENDANCE_DB_PATH`; falls back to an in-memory database.

use attendance_core::db::migrations::latest_version;
use attendance_core::db::{open_db, open_db_in_memory};
use attendance_core::{ExportScope, ReportService, SqliteReportRepository};
use std::process::ExitCode;

const DB_PATH_ENV: &str = "ATTENDANCE_DB_PATH";

fn main() -> ExitCode {
    println!("attendance_core ping={}", attendance_core::ping());
    println!("attendance_core version={}", attendance_core::core_version());
    println!("attendance_core schema_version={}", latest_version());

    let db_path = std::env::var(DB_PATH_ENV)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty());
    let opened = match db_path.as_deref() {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    };
    let conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("attendance_core db_open failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    let repo = match SqliteReportRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(err) => {
            eprintln!(
                "attendance_core summary failed: code={} error={err}",
                err.kind().code()
            );
            return ExitCode::FAILURE;
        }
    };
    let service = ReportService::new(repo);
    for scope in [ExportScope::Students, ExportScope::Attendance] {
        match service.export_rows(scope) {
            Ok(table) => println!(
                "attendance_core export scope={} columns={} rows={}",
                scope.as_str(),
                table.columns.len(),
                table.rows.len()
            ),
            Err(err) => {
                eprintln!(
                    "attendance_core export failed: scope={} code={} error={err}",
                    scope.as_str(),
                    err.kind().code()
                );
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
