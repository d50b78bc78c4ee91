//! Attendance ledger repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Record per-day attendance marks with insert-or-overwrite semantics.
//! - Provide per-date lookups used by marking sheets.
//!
//! # Invariants
//! - At most one row per `(student_id, date)`; later marks overwrite status.
//! - Student existence check and write share one `IMMEDIATE` transaction.
//! - Batch marks commit all rows or none.

use crate::model::attendance::{
    AttendanceDate, AttendanceRecord, AttendanceRecordId, AttendanceStatus,
};
use crate::model::student::{Student, StudentId};
use crate::repo::student_repo::{RepoError, RepoResult};
use crate::repo::{ensure_connection_ready, is_unique_violation, student_exists};
use crate::repo::{ATTENDANCE_TABLE, STUDENTS_TABLE};
use log::{info, warn};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::collections::BTreeMap;

const UPSERT_MARK_SQL: &str = "INSERT INTO attendance (student_id, date, status)
     VALUES (?1, ?2, ?3)
     ON CONFLICT (student_id, date) DO UPDATE SET status = excluded.status;";

const UPDATE_MARK_SQL: &str = "UPDATE attendance
     SET status = ?3
     WHERE student_id = ?1
       AND date = ?2;";

/// One roster row on a marking sheet, with the mark already stored for the
/// sheet date (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    pub student: Student,
    /// `None` means unmarked, which is distinct from `Absent`.
    pub recorded: Option<AttendanceStatus>,
}

impl SheetEntry {
    /// Initial sheet value: present only if a `Present` mark is stored.
    pub fn default_status(&self) -> AttendanceStatus {
        match self.recorded {
            Some(AttendanceStatus::Present) => AttendanceStatus::Present,
            _ => AttendanceStatus::Absent,
        }
    }
}

/// Repository interface for ledger operations.
pub trait AttendanceRepository {
    /// Inserts or overwrites the mark for one student on one day.
    fn upsert_mark(
        &self,
        student_id: StudentId,
        date: AttendanceDate,
        status: AttendanceStatus,
    ) -> RepoResult<()>;
    /// Applies many marks for one day in a single transaction.
    ///
    /// Returns the number of marks written.
    fn upsert_marks(
        &self,
        date: AttendanceDate,
        marks: &BTreeMap<StudentId, AttendanceStatus>,
    ) -> RepoResult<usize>;
    /// Loads stored statuses for one day keyed by student id.
    fn statuses_for_date(
        &self,
        date: AttendanceDate,
    ) -> RepoResult<BTreeMap<StudentId, AttendanceStatus>>;
    /// Loads the ledger row for one `(student_id, date)` pair.
    fn get_record(
        &self,
        student_id: StudentId,
        date: AttendanceDate,
    ) -> RepoResult<Option<AttendanceRecord>>;
    /// Lists the whole roster for one day with stored marks attached.
    fn sheet_for_date(&self, date: AttendanceDate) -> RepoResult<Vec<SheetEntry>>;
}

/// SQLite-backed attendance ledger repository.
pub struct SqliteAttendanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendanceRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[STUDENTS_TABLE, ATTENDANCE_TABLE])?;
        Ok(Self { conn })
    }
}

impl AttendanceRepository for SqliteAttendanceRepository<'_> {
    fn upsert_mark(
        &self,
        student_id: StudentId,
        date: AttendanceDate,
        status: AttendanceStatus,
    ) -> RepoResult<()> {
        let date_text = date.to_db_string();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        write_mark(&tx, student_id, date_text.as_str(), status)?;
        tx.commit()?;

        info!(
            "event=attendance_mark module=ledger status=ok student_id={student_id} date={date_text} mark={}",
            status.as_str()
        );
        Ok(())
    }

    fn upsert_marks(
        &self,
        date: AttendanceDate,
        marks: &BTreeMap<StudentId, AttendanceStatus>,
    ) -> RepoResult<usize> {
        let date_text = date.to_db_string();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for (student_id, status) in marks {
            if let Err(err) = write_mark(&tx, *student_id, date_text.as_str(), *status) {
                warn!(
                    "event=attendance_bulk_mark module=ledger status=error date={date_text} student_id={student_id} error_code={}",
                    err.kind().code()
                );
                return Err(err);
            }
        }
        tx.commit()?;

        info!(
            "event=attendance_bulk_mark module=ledger status=ok date={date_text} count={}",
            marks.len()
        );
        Ok(marks.len())
    }

    fn statuses_for_date(
        &self,
        date: AttendanceDate,
    ) -> RepoResult<BTreeMap<StudentId, AttendanceStatus>> {
        let mut stmt = self.conn.prepare(
            "SELECT student_id, status
             FROM attendance
             WHERE date = ?1;",
        )?;
        let mut rows = stmt.query([date.to_db_string()])?;
        let mut statuses = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let student_id: StudentId = row.get("student_id")?;
            let status = parse_status_column(row, "status")?;
            statuses.insert(student_id, status);
        }
        Ok(statuses)
    }

    fn get_record(
        &self,
        student_id: StudentId,
        date: AttendanceDate,
    ) -> RepoResult<Option<AttendanceRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, student_id, date, status
             FROM attendance
             WHERE student_id = ?1
               AND date = ?2;",
        )?;
        let mut rows = stmt.query(params![student_id, date.to_db_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }
        Ok(None)
    }

    fn sheet_for_date(&self, date: AttendanceDate) -> RepoResult<Vec<SheetEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.roll_no, s.name, s.class_label, a.status
             FROM students s
             LEFT JOIN attendance a
               ON a.student_id = s.id
              AND a.date = ?1
             ORDER BY s.class_label ASC, s.roll_no ASC;",
        )?;
        let mut rows = stmt.query([date.to_db_string()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            let recorded = match row.get::<_, Option<String>>("status")? {
                Some(value) => Some(parse_status(&value)?),
                None => None,
            };
            entries.push(SheetEntry {
                student: Student {
                    id: row.get("id")?,
                    roll_no: row.get("roll_no")?,
                    name: row.get("name")?,
                    class_label: row.get("class_label")?,
                },
                recorded,
            });
        }
        Ok(entries)
    }
}

/// Writes one mark inside the caller's transaction.
///
/// A uniqueness conflict surfacing from the upsert is retried once as a plain
/// update before the original error is returned. The `ON CONFLICT` clause
/// absorbs `(student_id, date)` collisions, so the retry only runs if that
/// clause stops matching the table's unique key (for example after a schema
/// change); no current write path reaches it.
fn write_mark(
    conn: &Connection,
    student_id: StudentId,
    date_text: &str,
    status: AttendanceStatus,
) -> RepoResult<()> {
    if !student_exists(conn, student_id)? {
        return Err(RepoError::StudentNotFound(student_id));
    }

    match conn.execute(
        UPSERT_MARK_SQL,
        params![student_id, date_text, status.as_str()],
    ) {
        Ok(_) => Ok(()),
        Err(err) if is_unique_violation(&err) => {
            warn!(
                "event=attendance_mark module=ledger status=retry student_id={student_id} date={date_text}"
            );
            let changed = conn.execute(
                UPDATE_MARK_SQL,
                params![student_id, date_text, status.as_str()],
            )?;
            if changed == 0 {
                return Err(err.into());
            }
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<AttendanceRecord> {
    let id: AttendanceRecordId = row.get("id")?;
    let date_text: String = row.get("date")?;
    let date = AttendanceDate::parse(&date_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{date_text}` in attendance.date"))
    })?;
    Ok(AttendanceRecord {
        id,
        student_id: row.get("student_id")?,
        date,
        status: parse_status_column(row, "status")?,
    })
}

fn parse_status_column(row: &Row<'_>, column: &str) -> RepoResult<AttendanceStatus> {
    let value: String = row.get(column)?;
    parse_status(&value)
}

pub(crate) fn parse_status(value: &str) -> RepoResult<AttendanceStatus> {
    AttendanceStatus::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{value}` in attendance.status"))
    })
}
