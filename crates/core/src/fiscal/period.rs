//! Financial period types and lifecycle rules.
//!
//! A period moves `Open -> Closed` exactly once; there is no reopen.

use chrono::{DateTime, NaiveDate, Utc};
use kassa_shared::types::{FinancialPeriodId, UserId};
use serde::{Deserialize, Serialize};

use super::error::PeriodError;

/// Granularity of a financial period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    /// Calendar month.
    Month,
    /// Quarter.
    Quarter,
    /// Financial year.
    Year,
    /// Arbitrary range.
    Custom,
}

/// A financial period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialPeriod {
    /// Unique identifier.
    pub id: FinancialPeriodId,
    /// Period name (e.g., "January 2026").
    pub name: String,
    /// Granularity.
    pub period_type: PeriodType,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period (inclusive).
    pub end_date: NaiveDate,
    /// Whether the period is closed for posting.
    pub is_closed: bool,
    /// Who closed the period.
    pub closed_by: Option<UserId>,
    /// When the period was closed.
    pub closed_at: Option<DateTime<Utc>>,
}

impl FinancialPeriod {
    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true if `[start, end]` shares at least one day with this period.
    #[must_use]
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end_date && end >= self.start_date
    }
}

/// Input for creating a financial period.
#[derive(Debug, Clone)]
pub struct CreatePeriodInput {
    /// Period name.
    pub name: String,
    /// Granularity.
    pub period_type: PeriodType,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day (inclusive).
    pub end_date: NaiveDate,
}

/// Pure lifecycle rules for financial periods.
pub struct PeriodManager;

impl PeriodManager {
    /// Validates a new period against the existing ones.
    ///
    /// Periods of the same type may not overlap; a month may sit inside a
    /// quarter or a year.
    ///
    /// # Errors
    ///
    /// Returns `EmptyName`, `InvalidRange` or `Overlap`.
    pub fn validate_new(
        input: &CreatePeriodInput,
        existing: &[FinancialPeriod],
    ) -> Result<(), PeriodError> {
        if input.name.trim().is_empty() {
            return Err(PeriodError::EmptyName);
        }
        if input.end_date < input.start_date {
            return Err(PeriodError::InvalidRange {
                start: input.start_date,
                end: input.end_date,
            });
        }

        if let Some(conflict) = existing.iter().find(|p| {
            p.period_type == input.period_type && p.overlaps(input.start_date, input.end_date)
        }) {
            return Err(PeriodError::Overlap {
                existing: conflict.name.clone(),
            });
        }

        Ok(())
    }

    /// Validates that a period may be closed.
    ///
    /// `draft_count` is the number of unposted entries dated inside the period.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyClosed` or `DraftEntriesInPeriod`.
    pub fn validate_close(period: &FinancialPeriod, draft_count: u64) -> Result<(), PeriodError> {
        if period.is_closed {
            return Err(PeriodError::AlreadyClosed(period.id));
        }
        if draft_count > 0 {
            return Err(PeriodError::DraftEntriesInPeriod { count: draft_count });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(name: &str, period_type: PeriodType, start: NaiveDate, end: NaiveDate) -> FinancialPeriod {
        FinancialPeriod {
            id: FinancialPeriodId::new(),
            name: name.to_string(),
            period_type,
            start_date: start,
            end_date: end,
            is_closed: false,
            closed_by: None,
            closed_at: None,
        }
    }

    fn input(period_type: PeriodType, start: NaiveDate, end: NaiveDate) -> CreatePeriodInput {
        CreatePeriodInput {
            name: "New".to_string(),
            period_type,
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn test_contains_date_is_inclusive() {
        let p = period("Jan", PeriodType::Month, date(2026, 1, 1), date(2026, 1, 31));
        assert!(p.contains_date(date(2026, 1, 1)));
        assert!(p.contains_date(date(2026, 1, 31)));
        assert!(!p.contains_date(date(2026, 2, 1)));
        assert!(!p.contains_date(date(2025, 12, 31)));
    }

    #[test]
    fn test_same_type_overlap_rejected() {
        let jan = period("Jan", PeriodType::Month, date(2026, 1, 1), date(2026, 1, 31));
        let result = PeriodManager::validate_new(
            &input(PeriodType::Month, date(2026, 1, 31), date(2026, 2, 27)),
            &[jan],
        );
        assert!(matches!(result, Err(PeriodError::Overlap { existing }) if existing == "Jan"));
    }

    #[test]
    fn test_month_inside_quarter_allowed() {
        let q1 = period("Q1", PeriodType::Quarter, date(2026, 1, 1), date(2026, 3, 31));
        assert!(
            PeriodManager::validate_new(
                &input(PeriodType::Month, date(2026, 2, 1), date(2026, 2, 28)),
                &[q1],
            )
            .is_ok()
        );
    }

    #[test]
    fn test_adjacent_periods_allowed() {
        let jan = period("Jan", PeriodType::Month, date(2026, 1, 1), date(2026, 1, 31));
        assert!(
            PeriodManager::validate_new(
                &input(PeriodType::Month, date(2026, 2, 1), date(2026, 2, 28)),
                &[jan],
            )
            .is_ok()
        );
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(matches!(
            PeriodManager::validate_new(
                &input(PeriodType::Custom, date(2026, 2, 1), date(2026, 1, 1)),
                &[],
            ),
            Err(PeriodError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_single_day_period_allowed() {
        assert!(
            PeriodManager::validate_new(
                &input(PeriodType::Custom, date(2026, 2, 1), date(2026, 2, 1)),
                &[],
            )
            .is_ok()
        );
    }

    #[test]
    fn test_close_rules() {
        let mut p = period("Jan", PeriodType::Month, date(2026, 1, 1), date(2026, 1, 31));
        assert!(PeriodManager::validate_close(&p, 0).is_ok());
        assert!(matches!(
            PeriodManager::validate_close(&p, 2),
            Err(PeriodError::DraftEntriesInPeriod { count: 2 })
        ));

        p.is_closed = true;
        assert!(matches!(
            PeriodManager::validate_close(&p, 0),
            Err(PeriodError::AlreadyClosed(_))
        ));
    }
}
