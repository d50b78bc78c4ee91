//! Attendance ledger domain model.
//!
//! # Responsibility
//! - Define the per-day attendance mark and its status values.
//! - Canonicalize calendar dates used as ledger keys.
//!
//! # Invariants
//! - At most one `AttendanceRecord` exists per `(student_id, date)`.
//! - `AttendanceDate` text form is `YYYY-MM-DD`, so string order equals
//!   calendar order.

use crate::model::student::StudentId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Storage-assigned surrogate key for a ledger row.
pub type AttendanceRecordId = i64;

const DATE_FORMAT: &str = "%Y-%m-%d";
const YEAR_DIGITS: usize = 4;

/// Present/absent state of one student on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    /// Stable text form used in storage and export rows.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
        }
    }

    /// Parses the stored text form. Matching is exact.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Present" => Some(Self::Present),
            "Absent" => Some(Self::Absent),
            _ => None,
        }
    }

    /// Maps a checkbox-style flag to a status.
    pub fn from_present(present: bool) -> Self {
        if present {
            Self::Present
        } else {
            Self::Absent
        }
    }
}

impl Display for AttendanceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Date input that cannot be read as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDateError {
    pub input: String,
}

impl Display for InvalidDateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid date `{}`; expected YYYY-MM-DD", self.input)
    }
}

impl Error for InvalidDateError {}

/// Calendar day used as the ledger's date key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct AttendanceDate(NaiveDate);

impl AttendanceDate {
    /// Parses a date string, tolerating surrounding whitespace.
    ///
    /// The year must be exactly four digits. Unpadded month and day
    /// (`2024-1-5`) are accepted and re-rendered in canonical form;
    /// impossible dates (`2023-02-29`) are rejected.
    pub fn parse(value: &str) -> Result<Self, InvalidDateError> {
        let invalid = || InvalidDateError {
            input: value.to_string(),
        };
        let trimmed = value.trim();
        // chrono's `%Y` takes signed years of any width, which would break
        // text ordering of stored dates.
        let year = trimmed.split('-').next().unwrap_or_default();
        if year.len() != YEAR_DIGITS || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .map(Self)
            .map_err(|_| invalid())
    }

    /// Canonical `YYYY-MM-DD` text used for storage and comparison.
    pub fn to_db_string(&self) -> String {
        self.0.format(DATE_FORMAT).to_string()
    }
}

impl Display for AttendanceDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for AttendanceDate {
    type Err = InvalidDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<AttendanceDate> for String {
    fn from(value: AttendanceDate) -> Self {
        value.to_db_string()
    }
}

impl TryFrom<String> for AttendanceDate {
    type Error = InvalidDateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// One ledger row: the status of one student on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: AttendanceRecordId,
    pub student_id: StudentId,
    pub date: AttendanceDate,
    pub status: AttendanceStatus,
}

#[cfg(test)]
mod tests {
    use super::{AttendanceDate, AttendanceStatus};

    #[test]
    fn date_parse_canonicalizes_unpadded_input() {
        let date = AttendanceDate::parse(" 2024-1-5 ").unwrap();
        assert_eq!(date.to_db_string(), "2024-01-05");
        assert_eq!(date.to_string(), "2024-01-05");
    }

    #[test]
    fn date_parse_rejects_malformed_and_impossible_dates() {
        for input in [
            "",
            "2024/01/10",
            "10-01-2024",
            "2023-02-29",
            "2024-13-01",
            "today",
            "24-01-10",
            "+2024-01-10",
            "-0001-01-01",
            "02024-01-10",
        ] {
            let err = AttendanceDate::parse(input).unwrap_err();
            assert_eq!(err.input, input);
        }
    }

    #[test]
    fn date_ordering_matches_text_ordering() {
        let earlier = AttendanceDate::parse("2024-01-09").unwrap();
        let later = AttendanceDate::parse("2024-01-10").unwrap();
        assert!(earlier < later);
        assert!(earlier.to_db_string() < later.to_db_string());
    }

    #[test]
    fn status_text_form_is_exact() {
        assert_eq!(AttendanceStatus::parse("Present"), Some(AttendanceStatus::Present));
        assert_eq!(AttendanceStatus::parse("absent"), None);
        assert_eq!(AttendanceStatus::from_present(false).as_str(), "Absent");
    }
}
