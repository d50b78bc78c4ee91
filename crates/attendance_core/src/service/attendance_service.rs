//! Attendance ledger use-case service.
//!
//! # Responsibility
//! - Parse date input and record single or batch marks.
//! - Build the per-date marking sheet over the whole roster.
//!
//! # Invariants
//! - Date strings are validated before any write is attempted.
//! - A batch either lands completely or leaves the ledger untouched.

use crate::model::attendance::{AttendanceDate, AttendanceStatus};
use crate::model::student::StudentId;
use crate::repo::attendance_repo::{AttendanceRepository, SheetEntry};
use crate::repo::student_repo::RepoResult;
use std::collections::BTreeMap;

/// Use-case service wrapper for ledger operations.
pub struct AttendanceService<R: AttendanceRepository> {
    repo: R,
}

impl<R: AttendanceRepository> AttendanceService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Records one student's status for one day, overwriting any earlier mark.
    ///
    /// # Errors
    /// - `RepoError::InvalidDate` when `date` is not `YYYY-MM-DD`.
    /// - `RepoError::StudentNotFound` when the student does not exist.
    pub fn mark(
        &self,
        student_id: StudentId,
        date: &str,
        status: AttendanceStatus,
    ) -> RepoResult<()> {
        let date = AttendanceDate::parse(date)?;
        self.repo.upsert_mark(student_id, date, status)
    }

    /// Returns stored statuses for one day.
    ///
    /// Students missing from the map are unmarked, not absent.
    pub fn get_for_date(&self, date: &str) -> RepoResult<BTreeMap<StudentId, AttendanceStatus>> {
        let date = AttendanceDate::parse(date)?;
        self.repo.statuses_for_date(date)
    }

    /// Records statuses for many students on one day, all or nothing.
    ///
    /// Returns the number of marks written.
    pub fn bulk_mark(
        &self,
        date: &str,
        assignments: &BTreeMap<StudentId, AttendanceStatus>,
    ) -> RepoResult<usize> {
        let date = AttendanceDate::parse(date)?;
        self.repo.upsert_marks(date, assignments)
    }

    /// Lists every roster student for one day with the stored mark, if any.
    pub fn attendance_sheet(&self, date: &str) -> RepoResult<Vec<SheetEntry>> {
        let date = AttendanceDate::parse(date)?;
        self.repo.sheet_for_date(date)
    }

    /// Saves a marking sheet where `present` lists the checked students.
    ///
    /// Every other student on the sheet is recorded as absent.
    pub fn save_sheet(
        &self,
        date: &str,
        sheet: &[SheetEntry],
        present: &[StudentId],
    ) -> RepoResult<usize> {
        let assignments = sheet
            .iter()
            .map(|entry| {
                let is_present = present.contains(&entry.student.id);
                (entry.student.id, AttendanceStatus::from_present(is_present))
            })
            .collect::<BTreeMap<_, _>>();
        self.bulk_mark(date, &assignments)
    }
}
