//! Standard operation types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use kassa_shared::types::{AccountId, AnalyticalAccountId, StandardOperationId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::EntrySide;

/// Caller-supplied percents for variable lines, keyed by zero-based line index.
pub type PercentOverrides = BTreeMap<usize, Decimal>;

/// A template line.
///
/// Exactly one of `debit_percent` / `credit_percent` is positive. For a
/// variable line that value is the default used when no override is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardOperationLine {
    /// Account to post to.
    pub account_id: AccountId,
    /// Optional cost-center tag.
    pub analytical_account_id: Option<AnalyticalAccountId>,
    /// Line description copied into the expanded entry.
    pub description: Option<String>,
    /// Share of the total on the debit side.
    pub debit_percent: Decimal,
    /// Share of the total on the credit side.
    pub credit_percent: Decimal,
    /// Whether the caller may override the percent at expansion time.
    pub is_variable: bool,
}

impl StandardOperationLine {
    /// Returns the side and percent of this line, or `None` if malformed.
    #[must_use]
    pub fn split(&self) -> Option<(EntrySide, Decimal)> {
        let debit = self.debit_percent > Decimal::ZERO;
        let credit = self.credit_percent > Decimal::ZERO;
        match (debit, credit) {
            (true, false) if self.credit_percent.is_zero() => {
                Some((EntrySide::Debit, self.debit_percent))
            }
            (false, true) if self.debit_percent.is_zero() => {
                Some((EntrySide::Credit, self.credit_percent))
            }
            _ => None,
        }
    }
}

/// A reusable template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardOperation {
    /// Unique identifier.
    pub id: StandardOperationId,
    /// Display name.
    pub name: String,
    /// Free-form grouping (e.g. "payroll", "sales").
    pub category: String,
    /// Optional description.
    pub description: Option<String>,
    /// Whether the template may be expanded.
    pub is_active: bool,
    /// Lines in order.
    pub lines: Vec<StandardOperationLine>,
    /// Author.
    pub created_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Input for a template line.
pub type TemplateLineInput = StandardOperationLine;

/// Input for creating a template.
#[derive(Debug, Clone)]
pub struct CreateTemplateInput {
    /// Display name.
    pub name: String,
    /// Free-form grouping.
    pub category: String,
    /// Optional description.
    pub description: Option<String>,
    /// Lines in order.
    pub lines: Vec<TemplateLineInput>,
    /// Author.
    pub created_by: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(debit: Decimal, credit: Decimal) -> StandardOperationLine {
        StandardOperationLine {
            account_id: AccountId::new(),
            analytical_account_id: None,
            description: None,
            debit_percent: debit,
            credit_percent: credit,
            is_variable: false,
        }
    }

    #[test]
    fn test_split() {
        assert_eq!(
            line(dec!(60), dec!(0)).split(),
            Some((EntrySide::Debit, dec!(60)))
        );
        assert_eq!(
            line(dec!(0), dec!(100)).split(),
            Some((EntrySide::Credit, dec!(100)))
        );
        assert_eq!(line(dec!(50), dec!(50)).split(), None);
        assert_eq!(line(dec!(0), dec!(0)).split(), None);
        assert_eq!(line(dec!(-10), dec!(10)).split(), None);
    }
}
