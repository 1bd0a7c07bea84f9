//! Business rule validation for journal lines.

use kassa_shared::types::money::{is_cent_precise, is_storable};
use rust_decimal::Decimal;

use super::error::{LedgerError, LineProblem};
use super::types::{EntrySide, EntryTotals, JournalLineInput};

/// Validates the shape of a single line and returns the side it hits.
///
/// # Errors
///
/// Returns the [`LineProblem`] if the line is not exactly one positive,
/// cent-precise, storable amount on one side.
pub fn validate_line(line: &JournalLineInput) -> Result<EntrySide, LineProblem> {
    if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
        return Err(LineProblem::Negative);
    }
    if !is_cent_precise(line.debit) || !is_cent_precise(line.credit) {
        return Err(LineProblem::SubCent);
    }
    if !is_storable(line.debit) || !is_storable(line.credit) {
        return Err(LineProblem::TooLarge);
    }
    match (line.debit.is_zero(), line.credit.is_zero()) {
        (false, false) => Err(LineProblem::BothSides),
        (true, true) => Err(LineProblem::NoAmount),
        (false, true) => Ok(EntrySide::Debit),
        (true, false) => Ok(EntrySide::Credit),
    }
}

/// Validates every line and the balance of the whole set.
///
/// Checks, in order: at least one line, each line's shape, then
/// sum(debit) == sum(credit).
///
/// # Errors
///
/// Returns `EmptyEntry`, `InvalidLine` or `UnbalancedEntry`.
pub fn validate_lines(lines: &[JournalLineInput]) -> Result<EntryTotals, LedgerError> {
    if lines.is_empty() {
        return Err(LedgerError::EmptyEntry);
    }

    for (index, line) in lines.iter().enumerate() {
        validate_line(line).map_err(|problem| LedgerError::InvalidLine {
            line: index,
            problem,
        })?;
    }

    let totals = calculate_totals(lines);
    if !totals.is_balanced {
        return Err(LedgerError::UnbalancedEntry {
            debit: totals.debit,
            credit: totals.credit,
        });
    }

    Ok(totals)
}

/// Calculates debit and credit totals without validating anything.
#[must_use]
pub fn calculate_totals(lines: &[JournalLineInput]) -> EntryTotals {
    EntryTotals::new(
        lines.iter().map(|l| l.debit).sum(),
        lines.iter().map(|l| l.credit).sum(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kassa_shared::types::AccountId;
    use rust_decimal_macros::dec;

    fn debit(amount: Decimal) -> JournalLineInput {
        JournalLineInput::debit(AccountId::new(), amount)
    }

    fn credit(amount: Decimal) -> JournalLineInput {
        JournalLineInput::credit(AccountId::new(), amount)
    }

    #[test]
    fn test_balanced_lines() {
        let totals = validate_lines(&[debit(dec!(100.00)), credit(dec!(100.00))]).unwrap();
        assert!(totals.is_balanced);
        assert_eq!(totals.debit, dec!(100.00));
    }

    #[test]
    fn test_unbalanced_lines() {
        assert!(matches!(
            validate_lines(&[debit(dec!(100.00)), credit(dec!(50.00))]),
            Err(LedgerError::UnbalancedEntry { .. })
        ));
    }

    #[test]
    fn test_no_lines() {
        assert!(matches!(validate_lines(&[]), Err(LedgerError::EmptyEntry)));
    }

    #[test]
    fn test_line_with_both_sides() {
        let mut line = debit(dec!(10));
        line.credit = dec!(10);
        assert!(matches!(
            validate_lines(&[line, debit(dec!(5)), credit(dec!(5))]),
            Err(LedgerError::InvalidLine {
                line: 0,
                problem: LineProblem::BothSides
            })
        ));
    }

    #[test]
    fn test_line_reports_its_index() {
        assert!(matches!(
            validate_lines(&[debit(dec!(10)), credit(dec!(0)), credit(dec!(10))]),
            Err(LedgerError::InvalidLine {
                line: 1,
                problem: LineProblem::NoAmount
            })
        ));
    }

    #[test]
    fn test_negative_amount() {
        assert_eq!(validate_line(&debit(dec!(-1))), Err(LineProblem::Negative));
    }

    #[test]
    fn test_sub_cent_amount() {
        assert_eq!(validate_line(&credit(dec!(0.001))), Err(LineProblem::SubCent));
        assert_eq!(validate_line(&credit(dec!(0.010))), Ok(EntrySide::Credit));
    }

    #[test]
    fn test_oversized_amount() {
        assert_eq!(
            validate_line(&debit(dec!(100000000000000000))),
            Err(LineProblem::TooLarge)
        );
        assert_eq!(
            validate_line(&debit(dec!(99999999999999999.99))),
            Ok(EntrySide::Debit)
        );
    }

    #[test]
    fn test_single_sided_zero_sum_is_unbalanced() {
        // One debit alone can never balance.
        assert!(matches!(
            validate_lines(&[debit(dec!(10))]),
            Err(LedgerError::UnbalancedEntry { .. })
        ));
    }
}
