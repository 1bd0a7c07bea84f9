//! Ledger error types for validation and state errors.
//!
//! This module defines all errors that can occur during journal operations,
//! including line shape errors, account errors, correspondence rejections,
//! period errors, and entry state errors.

use std::fmt;

use chrono::NaiveDate;
use kassa_shared::types::{AccountId, AnalyticalAccountId, JournalEntryId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Why a single journal line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineProblem {
    /// Both debit and credit are nonzero.
    BothSides,
    /// Neither debit nor credit is set.
    NoAmount,
    /// An amount is below zero.
    Negative,
    /// An amount has precision finer than one cent.
    SubCent,
    /// An amount does not fit a stored money column.
    TooLarge,
}

impl fmt::Display for LineProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BothSides => "line cannot be both debit and credit",
            Self::NoAmount => "line must have a debit or a credit amount",
            Self::Negative => "amounts cannot be negative",
            Self::SubCent => "amounts must be whole cents",
            Self::TooLarge => "amount exceeds the storable maximum",
        })
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Entry has no lines.
    #[error("Journal entry must have at least one line")]
    EmptyEntry,

    /// Entry is not balanced (debits != credits).
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// A line has an invalid shape.
    #[error("Invalid line {line}: {problem}")]
    InvalidLine {
        /// Zero-based line index.
        line: usize,
        /// What is wrong with it.
        problem: LineProblem,
    },

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account is inactive and cannot be used.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    /// Analytical account not found.
    #[error("Analytical account not found: {0}")]
    AnalyticalAccountNotFound(AnalyticalAccountId),

    /// Analytical account is inactive.
    #[error("Analytical account {0} is inactive")]
    AnalyticalAccountInactive(AnalyticalAccountId),

    /// Analytical account belongs to a different account than the line.
    #[error("Analytical account {analytical} does not belong to account {account}")]
    AnalyticalAccountMismatch {
        /// The analytical account on the line.
        analytical: AnalyticalAccountId,
        /// The account on the line.
        account: AccountId,
    },

    // ========== Correspondence Errors ==========
    /// Account pair refused under the reject policy.
    #[error("Correspondence {debit_account} / {credit_account} rejected: {reason}")]
    CorrespondenceRejected {
        /// Debited account.
        debit_account: AccountId,
        /// Credited account.
        credit_account: AccountId,
        /// Why the pair is not allowed.
        reason: String,
    },

    // ========== Period Errors ==========
    /// The entry date falls inside a closed financial period.
    #[error("Financial period {period} is closed, no posting allowed on {date}")]
    PeriodClosed {
        /// The entry date.
        date: NaiveDate,
        /// Name of the closed period.
        period: String,
    },

    // ========== Entry State Errors ==========
    /// Cannot modify a posted entry.
    #[error("Cannot modify posted journal entry")]
    CannotModifyPosted,

    /// Can only delete draft entries.
    #[error("Can only delete draft journal entries")]
    CanOnlyDeleteDraft,

    /// Entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(JournalEntryId),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyEntry => "EMPTY_ENTRY",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::InvalidLine { .. } => "INVALID_LINE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::AnalyticalAccountNotFound(_) => "ANALYTICAL_ACCOUNT_NOT_FOUND",
            Self::AnalyticalAccountInactive(_) => "ANALYTICAL_ACCOUNT_INACTIVE",
            Self::AnalyticalAccountMismatch { .. } => "ANALYTICAL_ACCOUNT_MISMATCH",
            Self::CorrespondenceRejected { .. } => "CORRESPONDENCE_REJECTED",
            Self::PeriodClosed { .. } => "PERIOD_CLOSED",
            Self::CannotModifyPosted => "CANNOT_MODIFY_POSTED",
            Self::CanOnlyDeleteDraft => "CAN_ONLY_DELETE_DRAFT",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
        }
    }

    /// Returns true if this error is a shape/balance validation failure.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyEntry | Self::UnbalancedEntry { .. } | Self::InvalidLine { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::EmptyEntry.error_code(), "EMPTY_ENTRY");
        assert_eq!(
            LedgerError::UnbalancedEntry {
                debit: dec!(1.00),
                credit: dec!(0.50),
            }
            .error_code(),
            "UNBALANCED_ENTRY"
        );
        assert_eq!(
            LedgerError::InvalidLine {
                line: 0,
                problem: LineProblem::BothSides,
            }
            .error_code(),
            "INVALID_LINE"
        );
        assert_eq!(
            LedgerError::PeriodClosed {
                date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                period: "March".to_string(),
            }
            .error_code(),
            "PERIOD_CLOSED"
        );
    }

    #[test]
    fn test_validation_classification() {
        assert!(LedgerError::EmptyEntry.is_validation());
        assert!(!LedgerError::AccountNotFound(AccountId::new()).is_validation());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::UnbalancedEntry {
            debit: dec!(100.00),
            credit: dec!(50.00),
        };
        assert_eq!(
            err.to_string(),
            "Journal entry is not balanced. Debit: 100.00, Credit: 50.00"
        );

        let err = LedgerError::InvalidLine {
            line: 2,
            problem: LineProblem::Negative,
        };
        assert_eq!(err.to_string(), "Invalid line 2: amounts cannot be negative");
    }
}
