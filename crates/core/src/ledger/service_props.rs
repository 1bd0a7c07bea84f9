//! Property-based tests for JournalService.
//!
//! - Balance integrity of accepted entries
//! - Rejection of unbalanced entries
//! - Account reference checks never depend on line order

use std::collections::HashSet;

use kassa_shared::types::{AccountId, AnalyticalAccountId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::service::{AccountInfo, AnalyticalInfo, JournalService};
use super::types::JournalLineInput;

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Builds a balanced entry: the debit amounts plus one credit for the total.
fn balanced_lines(debits: &[Decimal]) -> Vec<JournalLineInput> {
    let total: Decimal = debits.iter().copied().sum();
    let mut lines: Vec<JournalLineInput> = debits
        .iter()
        .map(|a| JournalLineInput::debit(AccountId::new(), *a))
        .collect();
    lines.push(JournalLineInput::credit(AccountId::new(), total));
    lines
}

/// Mock account lookup that always succeeds.
fn ok_account(id: AccountId) -> Option<AccountInfo> {
    Some(AccountInfo {
        id,
        is_active: true,
    })
}

/// Mock analytical lookup with no analytical accounts.
fn no_analytical(_: AnalyticalAccountId) -> Option<AnalyticalInfo> {
    None
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every accepted entry reports equal debit and credit totals.
    #[test]
    fn prop_accepted_entries_are_balanced(
        debits in prop::collection::vec(positive_amount(), 1..8),
    ) {
        let lines = balanced_lines(&debits);
        let totals = JournalService::validate_for_posting(&lines, ok_account, no_analytical);

        prop_assert!(totals.is_ok(), "Balanced entry should be accepted");
        let totals = totals.unwrap();
        prop_assert!(totals.is_balanced);
        prop_assert_eq!(totals.debit, totals.credit);
    }

    /// Any entry whose debits and credits differ is rejected.
    #[test]
    fn prop_unbalanced_entry_rejected(
        debit_amount in positive_amount(),
        credit_amount in positive_amount(),
    ) {
        prop_assume!(debit_amount != credit_amount);

        let lines = vec![
            JournalLineInput::debit(AccountId::new(), debit_amount),
            JournalLineInput::credit(AccountId::new(), credit_amount),
        ];

        prop_assert!(
            matches!(
                JournalService::validate_for_posting(&lines, ok_account, no_analytical),
                Err(LedgerError::UnbalancedEntry { .. })
            ),
            "Unbalanced entry should be rejected"
        );
    }

    /// A single unknown account anywhere in the entry rejects the whole entry.
    #[test]
    fn prop_unknown_account_rejects_entry(
        debits in prop::collection::vec(positive_amount(), 1..6),
        unknown_index in any::<prop::sample::Index>(),
    ) {
        let lines = balanced_lines(&debits);
        let unknown = lines[unknown_index.index(lines.len())].account_id;
        let known: HashSet<AccountId> =
            lines.iter().map(|l| l.account_id).filter(|id| *id != unknown).collect();

        let lookup = |id: AccountId| {
            known.contains(&id).then_some(AccountInfo { id, is_active: true })
        };

        prop_assert!(matches!(
            JournalService::validate_for_posting(&lines, lookup, no_analytical),
            Err(LedgerError::AccountNotFound(id)) if id == unknown
        ));
    }

    /// The sum of many accepted entries is itself balanced.
    #[test]
    fn prop_ledger_of_accepted_entries_balances(
        entries in prop::collection::vec(prop::collection::vec(positive_amount(), 1..5), 1..10),
    ) {
        let mut debit_sum = Decimal::ZERO;
        let mut credit_sum = Decimal::ZERO;

        for debits in &entries {
            let lines = balanced_lines(debits);
            let totals = JournalService::validate_for_posting(&lines, ok_account, no_analytical)
                .unwrap();
            debit_sum += totals.debit;
            credit_sum += totals.credit;
        }

        prop_assert_eq!(debit_sum, credit_sum);
    }
}
