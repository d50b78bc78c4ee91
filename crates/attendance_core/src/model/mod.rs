//! Domain model for roster and attendance ledger entries.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own field validation and date canonicalization rules.
//!
//! # Invariants
//! - Every student is identified by a storage-assigned `StudentId`.
//! - Attendance dates are always rendered as zero-padded `YYYY-MM-DD`.

pub mod attendance;
pub mod student;
