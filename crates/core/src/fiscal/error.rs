//! Financial period errors.

use chrono::NaiveDate;
use kassa_shared::types::FinancialPeriodId;
use thiserror::Error;

/// Errors raised while creating or closing financial periods.
#[derive(Debug, Error)]
pub enum PeriodError {
    /// Period name is empty.
    #[error("Period name cannot be empty")]
    EmptyName,

    /// End date precedes start date.
    #[error("Invalid period range: start {start} is after end {end}")]
    InvalidRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// The range overlaps another period of the same type.
    #[error("Period overlaps existing period {existing}")]
    Overlap {
        /// Name of the conflicting period.
        existing: String,
    },

    /// Period not found.
    #[error("Financial period not found: {0}")]
    NotFound(FinancialPeriodId),

    /// Period is already closed.
    #[error("Financial period {0} is already closed")]
    AlreadyClosed(FinancialPeriodId),

    /// Draft entries dated inside the period must be posted or deleted first.
    #[error("Cannot close period: {count} draft entries are dated inside it")]
    DraftEntriesInPeriod {
        /// Number of drafts found.
        count: u64,
    },
}

impl PeriodError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyName => "EMPTY_PERIOD_NAME",
            Self::InvalidRange { .. } => "INVALID_PERIOD_RANGE",
            Self::Overlap { .. } => "PERIOD_OVERLAP",
            Self::NotFound(_) => "PERIOD_NOT_FOUND",
            Self::AlreadyClosed(_) => "PERIOD_ALREADY_CLOSED",
            Self::DraftEntriesInPeriod { .. } => "DRAFT_ENTRIES_IN_PERIOD",
        }
    }
}
