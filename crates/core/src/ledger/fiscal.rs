//! Financial period gate for journal posting.
//!
//! - No period covers the date: posting allowed
//! - Every covering period is open: posting allowed
//! - Any covering period is closed: posting rejected

use chrono::NaiveDate;

use crate::fiscal::FinancialPeriod;
use crate::ledger::error::LedgerError;

/// Validates that an entry dated `date` may be posted or modified.
///
/// `periods` may contain any periods; only those covering `date` matter.
/// A month and the quarter containing it both gate the date, so closing
/// either one blocks posting.
///
/// # Errors
///
/// Returns `LedgerError::PeriodClosed` naming the first closed period found.
pub fn validate_posting_date(
    date: NaiveDate,
    periods: &[FinancialPeriod],
) -> Result<(), LedgerError> {
    match periods
        .iter()
        .find(|p| p.is_closed && p.contains_date(date))
    {
        Some(closed) => Err(LedgerError::PeriodClosed {
            date,
            period: closed.name.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiscal::PeriodType;
    use kassa_shared::types::FinancialPeriodId;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(start: NaiveDate, end: NaiveDate, is_closed: bool) -> FinancialPeriod {
        FinancialPeriod {
            id: FinancialPeriodId::new(),
            name: format!("{start}..{end}"),
            period_type: PeriodType::Custom,
            start_date: start,
            end_date: end,
            is_closed,
            closed_by: None,
            closed_at: None,
        }
    }

    #[test]
    fn test_undefined_range_is_permitted() {
        assert!(validate_posting_date(date(2026, 5, 5), &[]).is_ok());

        let jan = period(date(2026, 1, 1), date(2026, 1, 31), true);
        assert!(validate_posting_date(date(2026, 5, 5), &[jan]).is_ok());
    }

    #[test]
    fn test_open_period_allows_posting() {
        let jan = period(date(2026, 1, 1), date(2026, 1, 31), false);
        assert!(validate_posting_date(date(2026, 1, 15), &[jan]).is_ok());
    }

    #[test]
    fn test_closed_quarter_blocks_open_month() {
        let jan = period(date(2026, 1, 1), date(2026, 1, 31), false);
        let q1 = period(date(2026, 1, 1), date(2026, 3, 31), true);

        assert!(matches!(
            validate_posting_date(date(2026, 1, 15), &[jan, q1]),
            Err(LedgerError::PeriodClosed { .. })
        ));
    }

    /// Day offsets within a 60-day closed period starting 2026-03-01.
    fn offset_strategy() -> impl Strategy<Value = i64> {
        -30i64..90i64
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A closed period rejects exactly the dates inside it.
        #[test]
        fn prop_closed_period_rejects_only_its_range(offset in offset_strategy()) {
            let start = date(2026, 3, 1);
            let end = start + chrono::Duration::days(59);
            let closed = period(start, end, true);
            let target = start + chrono::Duration::days(offset);

            let result = validate_posting_date(target, std::slice::from_ref(&closed));
            if closed.contains_date(target) {
                prop_assert!(
                    matches!(result, Err(LedgerError::PeriodClosed { .. })),
                    "expected PeriodClosed, got {:?}",
                    result
                );
            } else {
                prop_assert!(result.is_ok());
            }
        }
    }
}
