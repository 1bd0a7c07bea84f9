//! Report data types.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use kassa_shared::types::{AccountId, Currency, ExpenseCategoryId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accounts::{AccountType, NormalSide};
use crate::cash::IncomeType;
use crate::ledger::Turnover;

/// One account's line in the trial balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Side on which the balance increases.
    pub normal_side: NormalSide,
    /// Sum of posted debits.
    pub debit_total: Decimal,
    /// Sum of posted credits.
    pub credit_total: Decimal,
}

impl TrialBalanceRow {
    /// Net balance signed by the normal side.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.normal_side
            .balance_change(self.debit_total, self.credit_total)
    }
}

/// Trial balance totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Total debit.
    pub total_debit: Decimal,
    /// Total credit.
    pub total_credit: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
}

/// Trial balance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalance {
    /// Last date included, or `None` for all posted entries.
    pub as_of: Option<NaiveDate>,
    /// Rows ordered by account code.
    pub rows: Vec<TrialBalanceRow>,
    /// Totals.
    pub totals: TrialBalanceTotals,
}

/// Turnover statement for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountStatement {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// First day of the range.
    pub date_from: NaiveDate,
    /// Last day of the range.
    pub date_to: NaiveDate,
    /// Opening, turnover and closing figures.
    pub turnover: Turnover,
}

/// Expenses aggregated for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// Category ID.
    pub category_id: ExpenseCategoryId,
    /// Category name.
    pub name: String,
    /// Sum of expenses.
    pub total: Decimal,
}

/// Income against expenses over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialSummary {
    /// First day of the range.
    pub start: NaiveDate,
    /// Last day of the range.
    pub end: NaiveDate,
    /// All income.
    pub total_income: Decimal,
    /// All expenses.
    pub total_expenses: Decimal,
    /// Income minus expenses.
    pub net_income: Decimal,
    /// Sales income minus expenses.
    pub operating_income: Decimal,
    /// Income per income type.
    pub income_by_type: BTreeMap<IncomeType, Decimal>,
    /// Expenses per category, largest first.
    pub expenses_by_category: Vec<CategoryTotal>,
    /// Current value of active factory assets when the report is built.
    pub total_assets: Decimal,
}

/// Headline cash figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashDashboard {
    /// Current cash balance.
    pub balance: Decimal,
    /// Currency of the balance.
    pub currency: Currency,
    /// First day of the current month.
    pub month_start: NaiveDate,
    /// Last day of the current month.
    pub month_end: NaiveDate,
    /// Income recorded this month.
    pub month_income: Decimal,
    /// Expenses recorded this month.
    pub month_expenses: Decimal,
    /// Current value of active factory assets.
    pub total_assets: Decimal,
}

impl CashDashboard {
    /// Income minus expenses for the month.
    #[must_use]
    pub fn month_net(&self) -> Decimal {
        self.month_income - self.month_expenses
    }
}
