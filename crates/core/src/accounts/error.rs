//! Account directory errors.

use kassa_shared::types::{AccountId, AnalyticalAccountId};
use thiserror::Error;

/// Errors raised while maintaining the chart of accounts.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Code is empty or contains characters outside `[A-Za-z0-9.]`.
    #[error("Invalid account code: {0:?}")]
    InvalidCode(String),

    /// Name is empty.
    #[error("Account name cannot be empty")]
    EmptyName,

    /// Another account already uses this code.
    #[error("Account code already exists: {0}")]
    DuplicateCode(String),

    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    /// Analytical account not found.
    #[error("Analytical account not found: {0}")]
    AnalyticalNotFound(AnalyticalAccountId),

    /// Parent assignment would make the account its own ancestor.
    #[error("Account {account} cannot be placed under {parent}: cycle detected")]
    CycleDetected {
        /// The account being moved.
        account: AccountId,
        /// The requested parent.
        parent: AccountId,
    },

    /// Parent account is inactive.
    #[error("Parent account {0} is inactive")]
    ParentInactive(AccountId),
}

impl AccountError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCode(_) => "INVALID_ACCOUNT_CODE",
            Self::EmptyName => "EMPTY_ACCOUNT_NAME",
            Self::DuplicateCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::NotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AnalyticalNotFound(_) => "ANALYTICAL_ACCOUNT_NOT_FOUND",
            Self::CycleDetected { .. } => "ACCOUNT_CYCLE",
            Self::ParentInactive(_) => "PARENT_ACCOUNT_INACTIVE",
        }
    }
}
