//! Report generation service.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use kassa_shared::types::Currency;
use rust_decimal::Decimal;

use super::error::ReportError;
use super::types::{
    AccountStatement, CashDashboard, CategoryTotal, FinancialSummary, TrialBalance,
    TrialBalanceRow, TrialBalanceTotals,
};
use crate::cash::IncomeType;
use crate::ledger::Turnover;

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Validates that `start` is not after `end`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` otherwise.
    pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), ReportError> {
        if start > end {
            return Err(ReportError::InvalidDateRange { start, end });
        }
        Ok(())
    }

    /// Generates a trial balance from per-account sums.
    ///
    /// Rows are sorted by code. The totals balance whenever every posted
    /// entry balanced.
    #[must_use]
    pub fn generate_trial_balance(
        mut rows: Vec<TrialBalanceRow>,
        as_of: Option<NaiveDate>,
    ) -> TrialBalance {
        rows.sort_by(|a, b| a.code.cmp(&b.code));
        let total_debit: Decimal = rows.iter().map(|r| r.debit_total).sum();
        let total_credit: Decimal = rows.iter().map(|r| r.credit_total).sum();

        TrialBalance {
            as_of,
            rows,
            totals: TrialBalanceTotals {
                total_debit,
                total_credit,
                is_balanced: total_debit == total_credit,
            },
        }
    }

    /// Generates a turnover statement for one account.
    ///
    /// `before` holds the (debit, credit) sums posted before `date_from`,
    /// `within` the sums posted inside the range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `date_from` is after `date_to`.
    pub fn account_statement(
        account: &TrialBalanceRow,
        date_from: NaiveDate,
        date_to: NaiveDate,
        before: (Decimal, Decimal),
        within: (Decimal, Decimal),
    ) -> Result<AccountStatement, ReportError> {
        Self::validate_range(date_from, date_to)?;
        Ok(AccountStatement {
            account_id: account.account_id,
            code: account.code.clone(),
            name: account.name.clone(),
            date_from,
            date_to,
            turnover: Turnover::from_sums(account.normal_side, before, within),
        })
    }

    /// Generates the financial summary for `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start` is after `end`.
    pub fn financial_summary(
        start: NaiveDate,
        end: NaiveDate,
        income: &[(IncomeType, Decimal)],
        mut expenses_by_category: Vec<CategoryTotal>,
        total_assets: Decimal,
    ) -> Result<FinancialSummary, ReportError> {
        Self::validate_range(start, end)?;

        let mut income_by_type = BTreeMap::new();
        for (income_type, amount) in income {
            *income_by_type.entry(*income_type).or_insert(Decimal::ZERO) += *amount;
        }
        let total_income: Decimal = income_by_type.values().copied().sum();
        let sales = income_by_type
            .get(&IncomeType::Sales)
            .copied()
            .unwrap_or(Decimal::ZERO);

        expenses_by_category
            .sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
        let total_expenses: Decimal = expenses_by_category.iter().map(|c| c.total).sum();

        Ok(FinancialSummary {
            start,
            end,
            total_income,
            total_expenses,
            net_income: total_income - total_expenses,
            operating_income: sales - total_expenses,
            income_by_type,
            expenses_by_category,
            total_assets,
        })
    }

    /// Returns the first and last day of the month containing `date`.
    #[must_use]
    pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
        let first = date.with_day(1).unwrap_or(date);
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        (first, last)
    }

    /// Assembles the cash dashboard for the month containing `today`.
    #[must_use]
    pub fn cash_dashboard(
        balance: Decimal,
        currency: Currency,
        today: NaiveDate,
        month_income: Decimal,
        month_expenses: Decimal,
        total_assets: Decimal,
    ) -> CashDashboard {
        let (month_start, month_end) = Self::month_bounds(today);
        CashDashboard {
            balance,
            currency,
            month_start,
            month_end,
            month_income,
            month_expenses,
            total_assets,
        }
    }
}
