//! Shared traits and errors for balance primitives.

use thiserror::Error;

/// Errors raised while constructing domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),
    #[error("Invalid date: {year}-{month:02}")]
    InvalidDate { year: i32, month: u32 },
}

/// Converts an entity into a short label suitable for log lines.
pub trait Displayable {
    fn display_label(&self) -> String;
}
