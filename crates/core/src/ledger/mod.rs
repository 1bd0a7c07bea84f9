//! Double-entry bookkeeping logic.
//!
//! This module implements the core journal functionality:
//! - Journal entry and line types
//! - Line shape and balance validation
//! - Account turnover and balance calculations
//! - Journal service for posting and draft validation
//! - Financial period posting gate
//! - Error types for journal operations

pub mod balance;
pub mod error;
pub mod fiscal;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod validation_props;

pub use balance::Turnover;
pub use error::{LedgerError, LineProblem};
pub use fiscal::validate_posting_date;
pub use service::{AccountInfo, AnalyticalInfo, JournalService};
pub use types::{
    CreateDraftInput, EntrySide, EntryStatus, EntryTotals, JournalEntry, JournalLine,
    JournalLineInput, PostEntryInput,
};
