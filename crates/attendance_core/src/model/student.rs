//! Student domain model.
//!
//! # Responsibility
//! - Define the roster record and its editable field set.
//! - Validate field triples before they reach storage.
//!
//! # Invariants
//! - `roll_no`, `name` and `class_label` are trimmed and non-empty.
//! - `id` is assigned by storage and never changes.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned surrogate key for a roster entry.
pub type StudentId = i64;

/// Validation failure for student field input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentValidationError {
    /// Named field is empty after trimming.
    EmptyField(&'static str),
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "student field `{field}` must not be empty"),
        }
    }
}

impl Error for StudentValidationError {}

/// Editable student fields, as accepted from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentFields {
    pub roll_no: String,
    pub name: String,
    /// Class/section the student belongs to. Exported as `class_label`.
    pub class_label: String,
}

impl StudentFields {
    /// Builds a field set with surrounding whitespace removed.
    pub fn new(
        roll_no: impl AsRef<str>,
        name: impl AsRef<str>,
        class_label: impl AsRef<str>,
    ) -> Self {
        Self {
            roll_no: roll_no.as_ref().trim().to_string(),
            name: name.as_ref().trim().to_string(),
            class_label: class_label.as_ref().trim().to_string(),
        }
    }

    /// Returns a copy with surrounding whitespace removed from every field.
    pub fn normalized(&self) -> Self {
        Self::new(&self.roll_no, &self.name, &self.class_label)
    }

    /// Checks that every field is filled.
    ///
    /// Fields are reported in form order: roll number, name, class.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        for (field, value) in [
            ("roll_no", &self.roll_no),
            ("name", &self.name),
            ("class_label", &self.class_label),
        ] {
            if value.trim().is_empty() {
                return Err(StudentValidationError::EmptyField(field));
            }
        }
        Ok(())
    }
}

/// Roster entry as persisted in the `students` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub roll_no: String,
    pub name: String,
    pub class_label: String,
}

impl Student {
    /// Combines a storage id with a validated field set.
    pub fn from_fields(id: StudentId, fields: StudentFields) -> Self {
        Self {
            id,
            roll_no: fields.roll_no,
            name: fields.name,
            class_label: fields.class_label,
        }
    }

    /// Selector label, e.g. `S1 - Alice`.
    pub fn display_label(&self) -> String {
        format!("{} - {}", self.roll_no, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::{Student, StudentFields, StudentValidationError};

    #[test]
    fn fields_are_trimmed_on_construction() {
        let fields = StudentFields::new("  S1 ", "Alice\t", " 10A");
        assert_eq!(fields.roll_no, "S1");
        assert_eq!(fields.name, "Alice");
        assert_eq!(fields.class_label, "10A");
        assert!(fields.validate().is_ok());
    }

    #[test]
    fn normalized_trims_directly_built_fields() {
        let raw = StudentFields {
            roll_no: " S1".to_string(),
            name: "Alice ".to_string(),
            class_label: "\t10A".to_string(),
        };
        assert_eq!(raw.normalized(), StudentFields::new("S1", "Alice", "10A"));
    }

    #[test]
    fn validate_reports_first_empty_field() {
        let err = StudentFields::new("S1", "   ", "").validate().unwrap_err();
        assert_eq!(err, StudentValidationError::EmptyField("name"));
    }

    #[test]
    fn display_label_joins_roll_and_name() {
        let student = Student::from_fields(7, StudentFields::new("S7", "Gina", "9B"));
        assert_eq!(student.display_label(), "S7 - Gina");
    }
}
