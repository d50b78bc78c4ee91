//! Roster use-case service.
//!
//! # Responsibility
//! - Provide add/edit/delete/list entry points for the student roster.
//! - Normalize field input before delegating to repository validation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Deleting a student always removes its attendance marks.

use crate::model::student::{Student, StudentFields, StudentId};
use crate::repo::student_repo::{RepoResult, StudentRepository};

/// Use-case service wrapper for roster operations.
pub struct RosterService<R: StudentRepository> {
    repo: R,
}

impl<R: StudentRepository> RosterService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds one student from form input.
    ///
    /// # Contract
    /// - Fields are trimmed; empty fields fail with `RepoError::Validation`.
    /// - A taken roll number fails with `RepoError::DuplicateRollNumber`.
    pub fn add_student(
        &self,
        roll_no: impl AsRef<str>,
        name: impl AsRef<str>,
        class_label: impl AsRef<str>,
    ) -> RepoResult<Student> {
        let fields = StudentFields::new(roll_no, name, class_label);
        self.repo.create_student(&fields)
    }

    /// Replaces the editable fields of one student.
    ///
    /// Keeping the student's own roll number is not a duplicate.
    pub fn update_student(
        &self,
        id: StudentId,
        roll_no: impl AsRef<str>,
        name: impl AsRef<str>,
        class_label: impl AsRef<str>,
    ) -> RepoResult<Student> {
        let fields = StudentFields::new(roll_no, name, class_label);
        self.repo.update_student(id, &fields)?;
        Ok(Student::from_fields(id, fields))
    }

    /// Deletes one student together with its attendance marks.
    ///
    /// Returns the number of attendance marks removed.
    pub fn delete_student(&self, id: StudentId) -> RepoResult<usize> {
        self.repo.delete_student(id)
    }

    /// Lists the roster ordered by class, then roll number.
    pub fn list_students(&self) -> RepoResult<Vec<Student>> {
        self.repo.list_students()
    }

    /// Gets one student by id.
    pub fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        self.repo.get_student(id)
    }
}
