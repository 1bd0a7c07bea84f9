//! Property-based tests for journal line validation rules.
//!
//! Covers line shape rules and the debit == credit balance invariant.

use kassa_shared::types::AccountId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::{LedgerError, LineProblem};
use super::types::{EntrySide, JournalLineInput};
use super::validation::{validate_line, validate_lines};

/// Strategy to generate a valid positive amount (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a negative amount.
fn negative_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

/// Strategy to generate a line side.
fn side_strategy() -> impl Strategy<Value = EntrySide> {
    prop_oneof![Just(EntrySide::Debit), Just(EntrySide::Credit)]
}

fn make_line(side: EntrySide, amount: Decimal) -> JournalLineInput {
    match side {
        EntrySide::Debit => JournalLineInput::debit(AccountId::new(), amount),
        EntrySide::Credit => JournalLineInput::credit(AccountId::new(), amount),
    }
}

fn opposite(side: EntrySide) -> EntrySide {
    match side {
        EntrySide::Debit => EntrySide::Credit,
        EntrySide::Credit => EntrySide::Debit,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A line carrying both a debit and a credit is always rejected.
    #[test]
    fn prop_both_sides_rejected(
        debit in positive_amount(),
        credit in positive_amount(),
    ) {
        let mut line = JournalLineInput::debit(AccountId::new(), debit);
        line.credit = credit;

        prop_assert_eq!(validate_line(&line), Err(LineProblem::BothSides));
    }

    /// Negative amounts are rejected whatever the other side holds.
    #[test]
    fn prop_negative_amount_rejected(
        side in side_strategy(),
        neg_amount in negative_amount(),
        other_amount in positive_amount(),
    ) {
        let lines = vec![
            make_line(side, neg_amount),
            make_line(opposite(side), other_amount),
        ];

        let result = validate_lines(&lines);
        prop_assert!(
            matches!(
                result,
                Err(LedgerError::InvalidLine { line: 0, problem: LineProblem::Negative })
            ),
            "Negative amount should be rejected, got: {:?}",
            result
        );
    }

    /// A single line can never balance.
    #[test]
    fn prop_single_line_rejected(
        side in side_strategy(),
        amount in positive_amount(),
    ) {
        let result = validate_lines(&[make_line(side, amount)]);
        prop_assert!(
            matches!(result, Err(LedgerError::UnbalancedEntry { .. })),
            "Single line should be unbalanced, got: {:?}",
            result
        );
    }

    /// Any split of debits that sums to the credit total is accepted, and
    /// the reported totals are equal.
    #[test]
    fn prop_split_debits_balance(
        amounts in prop::collection::vec(positive_amount(), 1..10),
    ) {
        let total: Decimal = amounts.iter().copied().sum();
        let mut lines: Vec<JournalLineInput> = amounts
            .iter()
            .map(|a| make_line(EntrySide::Debit, *a))
            .collect();
        lines.push(make_line(EntrySide::Credit, total));

        let totals = validate_lines(&lines);
        prop_assert!(totals.is_ok(), "Balanced entry rejected: {:?}", totals);
        let totals = totals.unwrap();
        prop_assert_eq!(totals.debit, totals.credit);
        prop_assert_eq!(totals.debit, total);
    }

    /// Debits and credits that differ by any cent are rejected.
    #[test]
    fn prop_off_by_cents_rejected(
        amount in positive_amount(),
        drift in 1i64..1_000i64,
    ) {
        let lines = vec![
            make_line(EntrySide::Debit, amount + Decimal::new(drift, 2)),
            make_line(EntrySide::Credit, amount),
        ];

        prop_assert!(
            matches!(validate_lines(&lines), Err(LedgerError::UnbalancedEntry { .. })),
            "Unbalanced entry should be rejected"
        );
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_zero_amount_example() {
        let lines = vec![
            make_line(EntrySide::Debit, Decimal::ZERO),
            make_line(EntrySide::Credit, Decimal::new(100, 2)),
        ];
        assert!(matches!(
            validate_lines(&lines),
            Err(LedgerError::InvalidLine {
                line: 0,
                problem: LineProblem::NoAmount
            })
        ));
    }

    #[test]
    fn test_minimum_valid_entry() {
        let lines = vec![
            make_line(EntrySide::Debit, Decimal::new(100, 2)),
            make_line(EntrySide::Credit, Decimal::new(100, 2)),
        ];
        assert!(validate_lines(&lines).is_ok());
    }
}
