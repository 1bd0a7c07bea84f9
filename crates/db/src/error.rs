//! Repository error type and its mapping onto [`AppError`].

use kassa_core::accounts::AccountError;
use kassa_core::assets::AssetError;
use kassa_core::cash::CashError;
use kassa_core::debt::DebtError;
use kassa_core::fiscal::PeriodError;
use kassa_core::ledger::LedgerError;
use kassa_core::reports::ReportError;
use kassa_core::templates::TemplateError;
use kassa_shared::AppError;
use sea_orm::DbErr;

/// Errors returned by repositories and the ledger engine.
///
/// Domain rejections keep the core error; storage failures keep the
/// `DbErr`.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Account directory rule violated.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Journal rule violated.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Standard operation rule violated.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Financial period rule violated.
    #[error(transparent)]
    Period(#[from] PeriodError),

    /// Cash or business event rule violated.
    #[error(transparent)]
    Cash(#[from] CashError),

    /// Debt rule violated.
    #[error(transparent)]
    Debt(#[from] DebtError),

    /// Asset register rule violated.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Report parameters rejected.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Stored event metadata could not be (de)serialized.
    #[error("Invalid event metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    /// A stored value does not map onto the domain model.
    #[error("Corrupt data: {0}")]
    Corrupt(String),

    /// Serialization failures persisted past the retry budget.
    #[error("Concurrent modification detected after {attempts} attempts, please retry")]
    Conflict {
        /// Attempts made.
        attempts: u32,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Result alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    /// Returns true if the caller may retry the operation unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        let message = err.to_string();
        match err {
            RepositoryError::Account(e) => match e {
                AccountError::NotFound(_) | AccountError::AnalyticalNotFound(_) => {
                    Self::NotFound(message)
                }
                AccountError::DuplicateCode(_)
                | AccountError::CycleDetected { .. }
                | AccountError::ParentInactive(_) => Self::BusinessRule(message),
                AccountError::InvalidCode(_) | AccountError::EmptyName => {
                    Self::Validation(message)
                }
            },
            RepositoryError::Ledger(e) => match e {
                LedgerError::PeriodClosed { .. } => Self::PeriodClosed(message),
                LedgerError::AccountNotFound(_)
                | LedgerError::AnalyticalAccountNotFound(_)
                | LedgerError::EntryNotFound(_) => Self::NotFound(message),
                e if e.is_validation() => Self::Validation(message),
                _ => Self::BusinessRule(message),
            },
            RepositoryError::Template(e) => match e {
                TemplateError::NotFound(_) => Self::NotFound(message),
                TemplateError::Inactive(_) | TemplateError::DegenerateLine { .. } => {
                    Self::BusinessRule(message)
                }
                _ => Self::Validation(message),
            },
            RepositoryError::Period(e) => match e {
                PeriodError::NotFound(_) => Self::NotFound(message),
                PeriodError::EmptyName | PeriodError::InvalidRange { .. } => {
                    Self::Validation(message)
                }
                _ => Self::BusinessRule(message),
            },
            RepositoryError::Cash(e) => match e {
                CashError::CategoryNotFound(_) | CashError::EventNotFound(_) => {
                    Self::NotFound(message)
                }
                CashError::NonPositiveAmount(_)
                | CashError::SubCentAmount(_)
                | CashError::AmountTooLarge(_)
                | CashError::EmptyField(_) => Self::Validation(message),
                _ => Self::BusinessRule(message),
            },
            RepositoryError::Debt(e) => match e {
                DebtError::NotFound(_) => Self::NotFound(message),
                _ => Self::Validation(message),
            },
            RepositoryError::Asset(e) => match e {
                AssetError::NotFound(_) => Self::NotFound(message),
                AssetError::Inactive(_) => Self::BusinessRule(message),
                _ => Self::Validation(message),
            },
            RepositoryError::Report(e) => match e {
                ReportError::AccountNotFound(_) => Self::NotFound(message),
                ReportError::InvalidDateRange { .. } => Self::Validation(message),
            },
            RepositoryError::Conflict { .. } => Self::Conflict(message),
            RepositoryError::Metadata(_) | RepositoryError::Corrupt(_) => Self::Internal(message),
            RepositoryError::Database(_) => Self::Database(message),
        }
    }
}
