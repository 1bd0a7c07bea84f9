//! Account directory types.

use chrono::{DateTime, Utc};
use kassa_shared::types::{AccountId, AnalyticalAccountId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account classification.
///
/// The type is informational; the [`NormalSide`] decides how a balance is signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset account.
    Asset,
    /// Liability account.
    Liability,
    /// Equity account.
    Equity,
    /// Income account.
    Income,
    /// Expense account.
    Expense,
}

impl AccountType {
    /// Returns the conventional normal side for this account type.
    #[must_use]
    pub const fn default_normal_side(self) -> NormalSide {
        match self {
            Self::Asset | Self::Expense => NormalSide::Debit,
            Self::Liability | Self::Equity | Self::Income => NormalSide::Credit,
        }
    }

    /// Returns the lowercase name used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

/// The side on which an account's balance increases.
///
/// - Debit-normal: balance = debit - credit
/// - Credit-normal: balance = credit - debit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalSide {
    /// Balance grows with debits.
    Debit,
    /// Balance grows with credits.
    Credit,
}

impl NormalSide {
    /// Calculates the signed balance change for a pair of turnovers.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// A chart of accounts entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Unique hierarchical code (e.g. "50" or "50.1").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Classification.
    pub account_type: AccountType,
    /// Side on which the balance increases.
    pub normal_side: NormalSide,
    /// Parent account, if any.
    pub parent_id: Option<AccountId>,
    /// Whether the account accepts postings.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Analytical (cost-center) sub-account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticalAccount {
    /// Unique identifier.
    pub id: AnalyticalAccountId,
    /// Code, unique within the parent account.
    pub code: String,
    /// Display name.
    pub name: String,
    /// The account this sub-account belongs to.
    pub parent_account_id: AccountId,
    /// Whether the sub-account may tag new lines.
    pub is_active: bool,
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Classification.
    pub account_type: AccountType,
    /// Normal side; defaults from the account type when absent.
    pub normal_side: Option<NormalSide>,
    /// Optional parent.
    pub parent_id: Option<AccountId>,
}

impl CreateAccountInput {
    /// Returns the explicit normal side or the one implied by the type.
    #[must_use]
    pub fn resolved_normal_side(&self) -> NormalSide {
        self.normal_side
            .unwrap_or_else(|| self.account_type.default_normal_side())
    }
}

/// Input for creating an analytical account.
#[derive(Debug, Clone)]
pub struct CreateAnalyticalAccountInput {
    /// Code, unique within the parent account.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Owning account.
    pub parent_account_id: AccountId,
}
