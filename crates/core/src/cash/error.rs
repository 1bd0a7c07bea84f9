//! Cash ledger errors.

use kassa_shared::types::{BusinessEventId, ExpenseCategoryId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::EventKind;

/// Errors raised by the cash ledger and business event recording.
#[derive(Debug, Error)]
pub enum CashError {
    /// Event amount is zero or negative.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Event amount has precision finer than one cent.
    #[error("Amount must be whole cents, got {0}")]
    SubCentAmount(Decimal),

    /// Amount does not fit a stored money column.
    #[error("Amount {0} exceeds the storable maximum")]
    AmountTooLarge(Decimal),

    /// A required text field is blank.
    #[error("Field {0} cannot be empty")]
    EmptyField(&'static str),

    /// Expense category not found.
    #[error("Expense category not found: {0}")]
    CategoryNotFound(ExpenseCategoryId),

    /// Category parent assignment would create a cycle.
    #[error("Expense category {category} cannot be placed under {parent}: cycle detected")]
    CategoryCycle {
        /// The category being moved.
        category: ExpenseCategoryId,
        /// The requested parent.
        parent: ExpenseCategoryId,
    },

    /// Business event not found.
    #[error("Business event not found: {0}")]
    EventNotFound(BusinessEventId),

    /// Metadata update tried to change the event kind.
    #[error("Cannot change event kind from {expected} to {actual}")]
    KindMismatch {
        /// Kind of the stored event.
        expected: EventKind,
        /// Kind of the submitted metadata.
        actual: EventKind,
    },

    /// Metadata update tried to move a payment to another debt.
    #[error("Cannot move a debt payment to a different debt")]
    DebtReassignment,

}

impl CashError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::SubCentAmount(_) => "SUB_CENT_AMOUNT",
            Self::AmountTooLarge(_) => "AMOUNT_TOO_LARGE",
            Self::EmptyField(_) => "EMPTY_FIELD",
            Self::CategoryNotFound(_) => "CATEGORY_NOT_FOUND",
            Self::CategoryCycle { .. } => "CATEGORY_CYCLE",
            Self::EventNotFound(_) => "EVENT_NOT_FOUND",
            Self::KindMismatch { .. } => "EVENT_KIND_MISMATCH",
            Self::DebtReassignment => "DEBT_REASSIGNMENT",
        }
    }
}
