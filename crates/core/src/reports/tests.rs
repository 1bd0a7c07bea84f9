//! Tests for report assembly.
//!
//! - Trial balance totals and balance flag
//! - Turnover statement signs
//! - Financial summary breakdowns
//! - Month bounds for the cash dashboard

use chrono::NaiveDate;
use kassa_shared::types::{AccountId, Currency, ExpenseCategoryId};
use proptest::prelude::*;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::ReportError;
use super::service::ReportService;
use super::types::{CategoryTotal, TrialBalanceRow};
use crate::accounts::AccountType;
use crate::cash::IncomeType;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn row(code: &str, account_type: AccountType, debit: Decimal, credit: Decimal) -> TrialBalanceRow {
    TrialBalanceRow {
        account_id: AccountId::new(),
        code: code.to_string(),
        name: format!("Account {code}"),
        account_type,
        normal_side: account_type.default_normal_side(),
        debit_total: debit,
        credit_total: credit,
    }
}

// ============================================================================
// Trial balance
// ============================================================================

#[test]
fn test_trial_balance_sorted_and_balanced() {
    let rows = vec![
        row("90", AccountType::Income, dec!(0), dec!(1500)),
        row("50", AccountType::Asset, dec!(1500), dec!(200)),
        row("44", AccountType::Expense, dec!(200), dec!(0)),
    ];

    let report = ReportService::generate_trial_balance(rows, Some(date(2026, 3, 31)));

    let codes: Vec<_> = report.rows.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["44", "50", "90"]);
    assert_eq!(report.totals.total_debit, dec!(1700));
    assert_eq!(report.totals.total_credit, dec!(1700));
    assert!(report.totals.is_balanced);
    assert_eq!(report.rows[1].balance(), dec!(1300));
    assert_eq!(report.rows[2].balance(), dec!(1500));
}

#[test]
fn test_empty_trial_balance_is_balanced() {
    let report = ReportService::generate_trial_balance(Vec::new(), None);
    assert_eq!(report.totals.total_debit, Decimal::ZERO);
    assert!(report.totals.is_balanced);
}

#[test]
fn test_unbalanced_sums_flagged() {
    let rows = vec![
        row("50", AccountType::Asset, dec!(100), dec!(0)),
        row("60", AccountType::Liability, dec!(0), dec!(99.99)),
    ];
    let report = ReportService::generate_trial_balance(rows, None);
    assert!(!report.totals.is_balanced);
}

// ============================================================================
// Account statement
// ============================================================================

#[test]
fn test_account_statement_credit_normal() {
    let account = row("60", AccountType::Liability, dec!(0), dec!(0));
    let statement = ReportService::account_statement(
        &account,
        date(2026, 2, 1),
        date(2026, 2, 28),
        (dec!(100), dec!(600)),
        (dec!(300), dec!(50)),
    )
    .unwrap();

    assert_eq!(statement.turnover.opening_balance, dec!(500));
    assert_eq!(statement.turnover.debit_turnover, dec!(300));
    assert_eq!(statement.turnover.credit_turnover, dec!(50));
    assert_eq!(statement.turnover.closing_balance, dec!(250));
}

#[test]
fn test_account_statement_rejects_inverted_range() {
    let account = row("50", AccountType::Asset, dec!(0), dec!(0));
    let result = ReportService::account_statement(
        &account,
        date(2026, 3, 1),
        date(2026, 2, 1),
        (Decimal::ZERO, Decimal::ZERO),
        (Decimal::ZERO, Decimal::ZERO),
    );
    assert!(matches!(result, Err(ReportError::InvalidDateRange { .. })));
}

// ============================================================================
// Financial summary
// ============================================================================

#[test]
fn test_financial_summary() {
    let glass = ExpenseCategoryId::new();
    let rent = ExpenseCategoryId::new();
    let summary = ReportService::financial_summary(
        date(2026, 1, 1),
        date(2026, 1, 31),
        &[
            (IncomeType::Sales, dec!(5000)),
            (IncomeType::Other, dec!(250)),
            (IncomeType::Sales, dec!(1000)),
        ],
        vec![
            CategoryTotal {
                category_id: rent,
                name: "Rent".to_string(),
                total: dec!(800),
            },
            CategoryTotal {
                category_id: glass,
                name: "Glass".to_string(),
                total: dec!(2200),
            },
        ],
        dec!(1200000),
    )
    .unwrap();

    assert_eq!(summary.total_income, dec!(6250));
    assert_eq!(summary.total_expenses, dec!(3000));
    assert_eq!(summary.net_income, dec!(3250));
    assert_eq!(summary.operating_income, dec!(3000));
    assert_eq!(summary.income_by_type[&IncomeType::Sales], dec!(6000));
    assert_eq!(summary.expenses_by_category[0].category_id, glass);
    assert_eq!(summary.total_assets, dec!(1200000));
}

#[test]
fn test_financial_summary_without_sales() {
    let summary = ReportService::financial_summary(
        date(2026, 1, 1),
        date(2026, 1, 31),
        &[(IncomeType::Other, dec!(100))],
        vec![],
        Decimal::ZERO,
    )
    .unwrap();
    assert_eq!(summary.operating_income, Decimal::ZERO);
    assert_eq!(summary.net_income, dec!(100));
}

// ============================================================================
// Cash dashboard
// ============================================================================

#[rstest]
#[case(date(2026, 2, 14), date(2026, 2, 1), date(2026, 2, 28))]
#[case(date(2028, 2, 29), date(2028, 2, 1), date(2028, 2, 29))]
#[case(date(2026, 12, 31), date(2026, 12, 1), date(2026, 12, 31))]
#[case(date(2026, 4, 1), date(2026, 4, 1), date(2026, 4, 30))]
fn test_month_bounds(#[case] today: NaiveDate, #[case] first: NaiveDate, #[case] last: NaiveDate) {
    assert_eq!(ReportService::month_bounds(today), (first, last));
}

#[test]
fn test_cash_dashboard() {
    let dashboard = ReportService::cash_dashboard(
        dec!(12500),
        Currency::default(),
        date(2026, 5, 17),
        dec!(4000),
        dec!(1500.50),
        dec!(640000),
    );
    assert_eq!(dashboard.month_start, date(2026, 5, 1));
    assert_eq!(dashboard.month_end, date(2026, 5, 31));
    assert_eq!(dashboard.month_net(), dec!(2499.50));
    assert_eq!(dashboard.total_assets, dec!(640000));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Rows built from balanced entries always produce a balanced report.
    #[test]
    fn prop_trial_balance_from_balanced_entries(
        entries in prop::collection::vec((0usize..6, 0usize..6, 1i64..1_000_000i64), 0..40),
    ) {
        let mut debits = [Decimal::ZERO; 6];
        let mut credits = [Decimal::ZERO; 6];
        for (dr, cr, cents) in &entries {
            let amount = Decimal::new(*cents, 2);
            debits[*dr] += amount;
            credits[*cr] += amount;
        }
        let rows: Vec<_> = (0..6)
            .map(|i| row(&format!("{}", 10 + i), AccountType::Asset, debits[i], credits[i]))
            .collect();

        let report = ReportService::generate_trial_balance(rows, None);
        prop_assert!(report.totals.is_balanced);
        prop_assert_eq!(report.totals.total_debit, report.totals.total_credit);
    }
}
