//! Journal domain types.
//!
//! A journal entry is a header plus an ordered list of lines. Each line hits
//! exactly one side of one account; the entry as a whole must balance.

use chrono::{DateTime, NaiveDate, Utc};
use kassa_shared::types::{
    AccountId, AnalyticalAccountId, JournalEntryId, JournalLineId, StandardOperationId, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Side of a journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    /// Debit side.
    Debit,
    /// Credit side.
    Credit,
}

/// Lifecycle of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Entry is being assembled and may be temporarily unbalanced.
    Draft,
    /// Entry has been posted to the ledger (immutable).
    Posted,
}

impl EntryStatus {
    /// Returns true if lines may still be added or removed.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft)
    }
}

/// Input for a single journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLineInput {
    /// The account to post to.
    pub account_id: AccountId,
    /// Optional cost-center tag; must belong to `account_id`.
    pub analytical_account_id: Option<AnalyticalAccountId>,
    /// Optional line description.
    pub description: Option<String>,
    /// Debit amount (zero on credit lines).
    pub debit: Decimal,
    /// Credit amount (zero on debit lines).
    pub credit: Decimal,
}

impl JournalLineInput {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            analytical_account_id: None,
            description: None,
            debit: amount,
            credit: Decimal::ZERO,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            analytical_account_id: None,
            description: None,
            debit: Decimal::ZERO,
            credit: amount,
        }
    }

    /// Tags the line with an analytical account.
    #[must_use]
    pub fn with_analytical(mut self, analytical_account_id: AnalyticalAccountId) -> Self {
        self.analytical_account_id = Some(analytical_account_id);
        self
    }

    /// Sets the line description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the side this line hits, or `None` if the shape is invalid.
    #[must_use]
    pub fn side(&self) -> Option<EntrySide> {
        match (self.debit.is_zero(), self.credit.is_zero()) {
            (false, true) => Some(EntrySide::Debit),
            (true, false) => Some(EntrySide::Credit),
            _ => None,
        }
    }

    /// Returns the nonzero amount of the line.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.debit + self.credit
    }
}

/// Input for posting a journal entry.
#[derive(Debug, Clone)]
pub struct PostEntryInput {
    /// Accounting date.
    pub date: NaiveDate,
    /// Free-text memo.
    pub memo: String,
    /// The user recording the entry.
    pub created_by: Option<UserId>,
    /// Entry lines (at least one).
    pub lines: Vec<JournalLineInput>,
}

/// Input for opening a draft entry.
#[derive(Debug, Clone)]
pub struct CreateDraftInput {
    /// Accounting date.
    pub date: NaiveDate,
    /// Free-text memo.
    pub memo: String,
    /// The user recording the entry.
    pub created_by: Option<UserId>,
}

/// A persisted journal line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalLine {
    /// Unique identifier.
    pub id: JournalLineId,
    /// Owning entry.
    pub entry_id: JournalEntryId,
    /// Display position within the entry.
    pub line_no: i32,
    /// Account posted to.
    pub account_id: AccountId,
    /// Optional cost-center tag.
    pub analytical_account_id: Option<AnalyticalAccountId>,
    /// Optional description.
    pub description: Option<String>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

/// A persisted journal entry with its lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Accounting date.
    pub date: NaiveDate,
    /// Free-text memo.
    pub memo: String,
    /// Draft or posted.
    pub status: EntryStatus,
    /// The user who created the entry.
    pub created_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Posting timestamp (posted entries only).
    pub posted_at: Option<DateTime<Utc>>,
    /// Standard operation the lines were expanded from, if any.
    pub standard_operation_id: Option<StandardOperationId>,
    /// Lines in display order.
    pub lines: Vec<JournalLine>,
}

impl JournalEntry {
    /// Calculates debit and credit totals over all lines.
    #[must_use]
    pub fn totals(&self) -> EntryTotals {
        EntryTotals::new(
            self.lines.iter().map(|l| l.debit).sum(),
            self.lines.iter().map(|l| l.credit).sum(),
        )
    }
}

/// Debit and credit totals of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTotals {
    /// Total debit amount.
    pub debit: Decimal,
    /// Total credit amount.
    pub credit: Decimal,
    /// Whether the entry is balanced (debits == credits).
    pub is_balanced: bool,
}

impl EntryTotals {
    /// Creates new totals from debit and credit sums.
    #[must_use]
    pub fn new(debit: Decimal, credit: Decimal) -> Self {
        Self {
            debit,
            credit,
            is_balanced: debit == credit,
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }
}
