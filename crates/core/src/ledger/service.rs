//! Journal service for entry validation.
//!
//! This module provides the core business logic for validating journal
//! entries before they are persisted to the database.

use kassa_shared::types::{AccountId, AnalyticalAccountId};

use super::error::LedgerError;
use super::types::{EntryStatus, EntryTotals, JournalLineInput};
use super::validation::{validate_line, validate_lines};

/// Information about an account needed for validation.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    /// The account ID.
    pub id: AccountId,
    /// Whether the account is active.
    pub is_active: bool,
}

/// Information about an analytical account needed for validation.
#[derive(Debug, Clone)]
pub struct AnalyticalInfo {
    /// The analytical account ID.
    pub id: AnalyticalAccountId,
    /// The account it belongs to.
    pub parent_account_id: AccountId,
    /// Whether the analytical account is active.
    pub is_active: bool,
}

/// Journal service for entry validation.
///
/// This service contains pure business logic with no database dependencies.
/// Account data is supplied through lookup closures.
pub struct JournalService;

impl JournalService {
    /// Validate an entry before posting.
    ///
    /// This function performs all validation steps:
    /// 1. Validates at least one line is present
    /// 2. Validates each line's shape (one side, positive, whole cents)
    /// 3. Validates the balance (debits = credits)
    /// 4. Validates accounts (exist, active)
    /// 5. Validates analytical accounts (exist, active, belong to the line's account)
    ///
    /// Period and correspondence checks are separate because they need
    /// data the caller loads under a lock.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if validation fails.
    pub fn validate_for_posting<A, N>(
        lines: &[JournalLineInput],
        account_lookup: A,
        analytical_lookup: N,
    ) -> Result<EntryTotals, LedgerError>
    where
        A: Fn(AccountId) -> Option<AccountInfo>,
        N: Fn(AnalyticalAccountId) -> Option<AnalyticalInfo>,
    {
        let totals = validate_lines(lines)?;
        for line in lines {
            Self::validate_references(line, &account_lookup, &analytical_lookup)?;
        }
        Ok(totals)
    }

    /// Validate a single line being added to a draft.
    ///
    /// Drafts may be unbalanced, so only the line's own shape and references
    /// are checked here; the balance is enforced when the draft is posted.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if the line is malformed or references a
    /// missing or inactive account.
    pub fn validate_draft_line<A, N>(
        line: &JournalLineInput,
        line_index: usize,
        account_lookup: A,
        analytical_lookup: N,
    ) -> Result<(), LedgerError>
    where
        A: Fn(AccountId) -> Option<AccountInfo>,
        N: Fn(AnalyticalAccountId) -> Option<AnalyticalInfo>,
    {
        validate_line(line).map_err(|problem| LedgerError::InvalidLine {
            line: line_index,
            problem,
        })?;
        Self::validate_references(line, &account_lookup, &analytical_lookup)
    }

    fn validate_references<A, N>(
        line: &JournalLineInput,
        account_lookup: &A,
        analytical_lookup: &N,
    ) -> Result<(), LedgerError>
    where
        A: Fn(AccountId) -> Option<AccountInfo>,
        N: Fn(AnalyticalAccountId) -> Option<AnalyticalInfo>,
    {
        let account =
            account_lookup(line.account_id).ok_or(LedgerError::AccountNotFound(line.account_id))?;
        if !account.is_active {
            return Err(LedgerError::AccountInactive(account.id));
        }

        if let Some(analytical_id) = line.analytical_account_id {
            let analytical = analytical_lookup(analytical_id)
                .ok_or(LedgerError::AnalyticalAccountNotFound(analytical_id))?;
            if analytical.parent_account_id != line.account_id {
                return Err(LedgerError::AnalyticalAccountMismatch {
                    analytical: analytical_id,
                    account: line.account_id,
                });
            }
            if !analytical.is_active {
                return Err(LedgerError::AnalyticalAccountInactive(analytical.id));
            }
        }

        Ok(())
    }

    /// Validate that an entry can be modified.
    ///
    /// # Errors
    ///
    /// Returns error if the entry is posted.
    pub fn validate_can_modify(status: EntryStatus) -> Result<(), LedgerError> {
        match status {
            EntryStatus::Posted => Err(LedgerError::CannotModifyPosted),
            EntryStatus::Draft => Ok(()),
        }
    }

    /// Validate that an entry can be deleted.
    ///
    /// Only draft entries can be deleted.
    ///
    /// # Errors
    ///
    /// Returns error if the entry is not a draft.
    pub fn validate_can_delete(status: EntryStatus) -> Result<(), LedgerError> {
        if status != EntryStatus::Draft {
            return Err(LedgerError::CanOnlyDeleteDraft);
        }
        Ok(())
    }
}
