//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into one call per user action.
//! - Accept raw presentation input (untrimmed fields, date strings) and
//!   normalize it before it reaches storage.
//! - Keep UI layers decoupled from storage details.

pub mod attendance_service;
pub mod report_service;
pub mod roster_service;
