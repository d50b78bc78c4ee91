//! Roster repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `students` table.
//! - Own the cascade from a deleted student to its attendance rows.
//!
//! # Invariants
//! - Write paths trim and validate `StudentFields` before SQL mutations.
//! - `roll_no` uniqueness is enforced by storage and reported as
//!   `RepoError::DuplicateRollNumber`.
//! - Student delete and attendance cascade commit together or not at all.

use crate::db::DbError;
use crate::model::attendance::InvalidDateError;
use crate::model::student::{Student, StudentFields, StudentId, StudentValidationError};
use crate::repo::{ensure_connection_ready, is_unique_violation, student_exists};
use crate::repo::{ATTENDANCE_TABLE, STUDENTS_TABLE};
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    roll_no,
    name,
    class_label
FROM students";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for roster, ledger and report persistence operations.
#[derive(Debug)]
pub enum RepoError {
    /// Student field input failed validation.
    Validation(StudentValidationError),
    /// Another student already uses this roll number.
    DuplicateRollNumber(String),
    /// Target student does not exist.
    StudentNotFound(StudentId),
    /// Date input is not a calendar date in `YYYY-MM-DD` form.
    InvalidDate(InvalidDateError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

/// Caller-facing classification of `RepoError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    DuplicateRollNumber,
    NotFound,
    InvalidDate,
    Storage,
}

impl ErrorKind {
    /// Stable snake_case code for presentation-layer message lookup.
    pub fn code(self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::DuplicateRollNumber => "duplicate_roll_number",
            Self::NotFound => "not_found",
            Self::InvalidDate => "invalid_date",
            Self::Storage => "storage_error",
        }
    }
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::DuplicateRollNumber(_) => ErrorKind::DuplicateRollNumber,
            Self::StudentNotFound(_) => ErrorKind::NotFound,
            Self::InvalidDate(_) => ErrorKind::InvalidDate,
            Self::Db(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => ErrorKind::Storage,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateRollNumber(roll_no) => {
                write!(f, "roll number already exists: `{roll_no}`")
            }
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::InvalidDate(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "attendance repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "attendance repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "attendance repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidDate(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StudentValidationError> for RepoError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<InvalidDateError> for RepoError {
    fn from(value: InvalidDateError) -> Self {
        Self::InvalidDate(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for roster operations.
pub trait StudentRepository {
    /// Inserts one student and returns it with its assigned id.
    fn create_student(&self, fields: &StudentFields) -> RepoResult<Student>;
    /// Replaces all editable fields of one student.
    fn update_student(&self, id: StudentId, fields: &StudentFields) -> RepoResult<()>;
    /// Loads one student by id.
    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    /// Lists the roster ordered by `class_label ASC, roll_no ASC`.
    fn list_students(&self) -> RepoResult<Vec<Student>>;
    /// Deletes one student and its attendance rows in one transaction.
    ///
    /// Returns the number of attendance rows removed by the cascade.
    fn delete_student(&self, id: StudentId) -> RepoResult<usize>;
}

/// SQLite-backed roster repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[STUDENTS_TABLE, ATTENDANCE_TABLE])?;
        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create_student(&self, fields: &StudentFields) -> RepoResult<Student> {
        let fields = &fields.normalized();
        fields.validate()?;

        self.conn
            .execute(
                "INSERT INTO students (roll_no, name, class_label) VALUES (?1, ?2, ?3);",
                params![
                    fields.roll_no.as_str(),
                    fields.name.as_str(),
                    fields.class_label.as_str()
                ],
            )
            .map_err(|err| map_roll_no_conflict(err, fields))?;

        let id = self.conn.last_insert_rowid();
        info!("event=student_add module=roster status=ok student_id={id}");
        Ok(Student::from_fields(id, fields.clone()))
    }

    fn update_student(&self, id: StudentId, fields: &StudentFields) -> RepoResult<()> {
        let fields = &fields.normalized();
        fields.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE students
                 SET
                    roll_no = ?1,
                    name = ?2,
                    class_label = ?3
                 WHERE id = ?4;",
                params![
                    fields.roll_no.as_str(),
                    fields.name.as_str(),
                    fields.class_label.as_str(),
                    id
                ],
            )
            .map_err(|err| map_roll_no_conflict(err, fields))?;

        if changed == 0 {
            return Err(RepoError::StudentNotFound(id));
        }

        info!("event=student_update module=roster status=ok student_id={id}");
        Ok(())
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let student = self
            .conn
            .query_row(
                &format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_student_row,
            )
            .optional()?;
        Ok(student)
    }

    fn list_students(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self.conn.prepare(&format!(
            "{STUDENT_SELECT_SQL} ORDER BY class_label ASC, roll_no ASC;"
        ))?;
        let students = stmt
            .query_map([], parse_student_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(students)
    }

    fn delete_student(&self, id: StudentId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !student_exists(&tx, id)? {
            warn!("event=student_delete module=roster status=error student_id={id} error_code=not_found");
            return Err(RepoError::StudentNotFound(id));
        }

        let removed_marks = tx.execute("DELETE FROM attendance WHERE student_id = ?1;", [id])?;
        tx.execute("DELETE FROM students WHERE id = ?1;", [id])?;
        tx.commit()?;

        info!(
            "event=student_delete module=roster status=ok student_id={id} removed_marks={removed_marks}"
        );
        Ok(removed_marks)
    }
}

fn parse_student_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get("id")?,
        roll_no: row.get("roll_no")?,
        name: row.get("name")?,
        class_label: row.get("class_label")?,
    })
}

fn map_roll_no_conflict(err: rusqlite::Error, fields: &StudentFields) -> RepoError {
    if is_unique_violation(&err) {
        warn!("event=student_write module=roster status=error error_code=duplicate_roll_number");
        return RepoError::DuplicateRollNumber(fields.roll_no.clone());
    }
    err.into()
}
