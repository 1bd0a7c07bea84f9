//! Debt tracker errors.

use kassa_shared::types::DebtId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the debt tracker.
#[derive(Debug, Error)]
pub enum DebtError {
    /// Debt not found.
    #[error("Debt not found: {0}")]
    NotFound(DebtId),

    /// Amount is zero or negative.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Amount has precision finer than one cent.
    #[error("Amount must be whole cents, got {0}")]
    SubCentAmount(Decimal),

    /// Amount does not fit a stored money column.
    #[error("Amount {0} exceeds the storable maximum")]
    AmountTooLarge(Decimal),

    /// A required text field is blank.
    #[error("Field {0} cannot be empty")]
    EmptyField(&'static str),

}

impl DebtError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "DEBT_NOT_FOUND",
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::SubCentAmount(_) => "SUB_CENT_AMOUNT",
            Self::AmountTooLarge(_) => "AMOUNT_TOO_LARGE",
            Self::EmptyField(_) => "EMPTY_FIELD",
        }
    }
}
