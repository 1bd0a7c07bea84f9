//! Standard operation expansion.
//!
//! Each line receives `total * percent / 100`, rounded half-up to cents.
//! Rounding drift on each side is then absorbed by the last line of that
//! side, so both sides sum to the rounded total exactly.

use kassa_shared::types::money::{is_storable, round_money};
use rust_decimal::Decimal;

use super::error::TemplateError;
use super::types::{CreateTemplateInput, PercentOverrides, StandardOperation, StandardOperationLine};
use crate::ledger::{EntrySide, JournalLineInput};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Decimal places a stored split percent keeps (`NUMERIC(7, 4)`).
const PERCENT_SCALE: u32 = 4;

/// Pure template validation and expansion.
pub struct TemplateExpander;

impl TemplateExpander {
    /// Validates a template definition.
    ///
    /// # Errors
    ///
    /// Returns `EmptyName`, `EmptyTemplate`, `InvalidLine`,
    /// `PercentTooPrecise` or `PercentSum`.
    pub fn validate_definition(input: &CreateTemplateInput) -> Result<(), TemplateError> {
        if input.name.trim().is_empty() {
            return Err(TemplateError::EmptyName);
        }
        Self::resolve_splits(&input.lines, &PercentOverrides::new()).map(|_| ())
    }

    /// Expands an active template into balanced journal lines.
    ///
    /// # Errors
    ///
    /// Returns `Inactive` for a deactivated template, plus everything
    /// [`Self::expand_lines`] can return.
    pub fn expand(
        template: &StandardOperation,
        total: Decimal,
        overrides: &PercentOverrides,
    ) -> Result<Vec<JournalLineInput>, TemplateError> {
        if !template.is_active {
            return Err(TemplateError::Inactive(template.id));
        }
        Self::expand_lines(&template.lines, total, overrides)
    }

    /// Expands template lines against `total`.
    ///
    /// The output keeps template order. Debits and credits each sum to
    /// `round_money(total)`.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveTotal`, `AmountTooLarge`, override errors,
    /// `InvalidLine`, `PercentTooPrecise`, `PercentSum` or `DegenerateLine`.
    pub fn expand_lines(
        lines: &[StandardOperationLine],
        total: Decimal,
        overrides: &PercentOverrides,
    ) -> Result<Vec<JournalLineInput>, TemplateError> {
        let total = round_money(total);
        if total <= Decimal::ZERO {
            return Err(TemplateError::NonPositiveTotal(total));
        }
        if !is_storable(total) {
            return Err(TemplateError::AmountTooLarge(total));
        }

        let splits = Self::resolve_splits(lines, overrides)?;

        let mut amounts = splits
            .iter()
            .map(|(_, percent)| {
                total
                    .checked_mul(*percent)
                    .and_then(|v| v.checked_div(HUNDRED))
                    .map(round_money)
                    .ok_or(TemplateError::AmountTooLarge(total))
            })
            .collect::<Result<Vec<_>, TemplateError>>()?;

        for side in [EntrySide::Debit, EntrySide::Credit] {
            let allocated: Decimal = splits
                .iter()
                .zip(&amounts)
                .filter(|((s, _), _)| *s == side)
                .map(|(_, a)| *a)
                .sum();
            if let Some(last) = splits.iter().rposition(|(s, _)| *s == side) {
                amounts[last] += total - allocated;
            }
        }

        if let Some(line) = amounts.iter().position(|a| *a <= Decimal::ZERO) {
            return Err(TemplateError::DegenerateLine { line });
        }

        Ok(lines
            .iter()
            .zip(splits)
            .zip(amounts)
            .map(|((line, (side, _)), amount)| {
                let mut out = match side {
                    EntrySide::Debit => JournalLineInput::debit(line.account_id, amount),
                    EntrySide::Credit => JournalLineInput::credit(line.account_id, amount),
                };
                out.analytical_account_id = line.analytical_account_id;
                out.description.clone_from(&line.description);
                out
            })
            .collect())
    }

    /// Resolves each line's side and effective percent and checks the sums.
    fn resolve_splits(
        lines: &[StandardOperationLine],
        overrides: &PercentOverrides,
    ) -> Result<Vec<(EntrySide, Decimal)>, TemplateError> {
        if lines.is_empty() {
            return Err(TemplateError::EmptyTemplate);
        }

        for (&index, &percent) in overrides {
            let line = lines.get(index).ok_or(TemplateError::UnknownLine(index))?;
            if !line.is_variable {
                return Err(TemplateError::NotVariable(index));
            }
            if percent <= Decimal::ZERO || percent > HUNDRED {
                return Err(TemplateError::InvalidPercent {
                    line: index,
                    percent,
                });
            }
        }

        let splits = lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let (side, default) = line.split().ok_or(TemplateError::InvalidLine { line: index })?;
                Ok((side, overrides.get(&index).copied().unwrap_or(default)))
            })
            .collect::<Result<Vec<_>, TemplateError>>()?;

        if let Some((line, (_, percent))) = splits
            .iter()
            .enumerate()
            .find(|(_, (_, p))| p.normalize().scale() > PERCENT_SCALE)
        {
            return Err(TemplateError::PercentTooPrecise {
                line,
                percent: *percent,
            });
        }

        for side in [EntrySide::Debit, EntrySide::Credit] {
            let sum: Decimal = splits
                .iter()
                .filter(|(s, _)| *s == side)
                .map(|(_, p)| *p)
                .sum();
            if sum != HUNDRED {
                return Err(TemplateError::PercentSum { side, sum });
            }
        }

        Ok(splits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kassa_shared::types::{AccountId, StandardOperationId};
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

    fn variable(mut l: StandardOperationLine) -> StandardOperationLine {
        l.is_variable = true;
        l
    }

    fn template(lines: Vec<StandardOperationLine>) -> StandardOperation {
        StandardOperation {
            id: StandardOperationId::new(),
            name: "Sale".to_string(),
            category: "sales".to_string(),
            description: None,
            is_active: true,
            lines,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    fn sums(lines: &[JournalLineInput]) -> (Decimal, Decimal) {
        (
            lines.iter().map(|l| l.debit).sum(),
            lines.iter().map(|l| l.credit).sum(),
        )
    }

    #[test]
    fn test_sixty_forty_split() {
        let lines = vec![line(dec!(60), dec!(0)), line(dec!(40), dec!(0)), line(dec!(0), dec!(100))];
        let out = TemplateExpander::expand_lines(&lines, dec!(1000.00), &PercentOverrides::new())
            .unwrap();

        assert_eq!(out[0].debit, dec!(600.00));
        assert_eq!(out[1].debit, dec!(400.00));
        assert_eq!(out[2].credit, dec!(1000.00));
        assert_eq!(sums(&out), (dec!(1000.00), dec!(1000.00)));
        assert_eq!(out[0].account_id, lines[0].account_id);
    }

    #[test]
    fn test_residue_goes_to_last_line_of_side() {
        let lines = vec![
            line(dec!(33.33), dec!(0)),
            line(dec!(33.33), dec!(0)),
            line(dec!(33.34), dec!(0)),
            line(dec!(0), dec!(100)),
        ];
        let out =
            TemplateExpander::expand_lines(&lines, dec!(10.00), &PercentOverrides::new()).unwrap();

        // 3.333 -> 3.33, 3.333 -> 3.33, 3.334 -> 3.33, residue 0.01 to the last debit
        assert_eq!(out[0].debit, dec!(3.33));
        assert_eq!(out[1].debit, dec!(3.33));
        assert_eq!(out[2].debit, dec!(3.34));
        assert_eq!(sums(&out), (dec!(10.00), dec!(10.00)));
    }

    #[test]
    fn test_half_up_rounding_with_negative_residue() {
        let lines = vec![line(dec!(50), dec!(0)), line(dec!(50), dec!(0)), line(dec!(0), dec!(100))];
        let out =
            TemplateExpander::expand_lines(&lines, dec!(0.05), &PercentOverrides::new()).unwrap();

        // 0.025 rounds up twice to 0.03; the last debit gives a cent back
        assert_eq!(out[0].debit, dec!(0.03));
        assert_eq!(out[1].debit, dec!(0.02));
        assert_eq!(sums(&out), (dec!(0.05), dec!(0.05)));
    }

    #[test]
    fn test_total_is_rounded_first() {
        let lines = vec![line(dec!(100), dec!(0)), line(dec!(0), dec!(100))];
        let out =
            TemplateExpander::expand_lines(&lines, dec!(99.995), &PercentOverrides::new()).unwrap();
        assert_eq!(sums(&out), (dec!(100.00), dec!(100.00)));
    }

    #[test]
    fn test_degenerate_line_rejected() {
        let lines = vec![
            line(dec!(99), dec!(0)),
            line(dec!(0.5), dec!(0)),
            line(dec!(0.5), dec!(0)),
            line(dec!(0), dec!(100)),
        ];
        // 0.01 * 99% rounds to 0.01, leaving nothing for the other debits
        assert!(matches!(
            TemplateExpander::expand_lines(&lines, dec!(0.01), &PercentOverrides::new()),
            Err(TemplateError::DegenerateLine { line: 1 })
        ));
    }

    #[test]
    fn test_non_positive_total_rejected() {
        let lines = vec![line(dec!(100), dec!(0)), line(dec!(0), dec!(100))];
        for total in [dec!(0), dec!(-5), dec!(0.004)] {
            assert!(matches!(
                TemplateExpander::expand_lines(&lines, total, &PercentOverrides::new()),
                Err(TemplateError::NonPositiveTotal(_))
            ));
        }
    }

    #[test]
    fn test_percent_sum_must_be_hundred() {
        let lines = vec![line(dec!(60), dec!(0)), line(dec!(30), dec!(0)), line(dec!(0), dec!(100))];
        assert!(matches!(
            TemplateExpander::expand_lines(&lines, dec!(100), &PercentOverrides::new()),
            Err(TemplateError::PercentSum {
                side: EntrySide::Debit,
                ..
            })
        ));
    }

    #[test]
    fn test_variable_overrides() {
        let lines = vec![
            variable(line(dec!(50), dec!(0))),
            variable(line(dec!(50), dec!(0))),
            line(dec!(0), dec!(100)),
        ];
        let overrides = PercentOverrides::from([(0, dec!(70)), (1, dec!(30))]);
        let out = TemplateExpander::expand_lines(&lines, dec!(200), &overrides).unwrap();
        assert_eq!(out[0].debit, dec!(140.00));
        assert_eq!(out[1].debit, dec!(60.00));
    }

    #[test]
    fn test_override_that_breaks_sum_rejected() {
        let lines = vec![
            variable(line(dec!(50), dec!(0))),
            line(dec!(50), dec!(0)),
            line(dec!(0), dec!(100)),
        ];
        let overrides = PercentOverrides::from([(0, dec!(70))]);
        assert!(matches!(
            TemplateExpander::expand_lines(&lines, dec!(200), &overrides),
            Err(TemplateError::PercentSum { .. })
        ));
    }

    #[test]
    fn test_override_errors() {
        let lines = vec![line(dec!(100), dec!(0)), variable(line(dec!(0), dec!(100)))];

        assert!(matches!(
            TemplateExpander::expand_lines(&lines, dec!(1), &PercentOverrides::from([(5, dec!(1))])),
            Err(TemplateError::UnknownLine(5))
        ));
        assert!(matches!(
            TemplateExpander::expand_lines(&lines, dec!(1), &PercentOverrides::from([(0, dec!(100))])),
            Err(TemplateError::NotVariable(0))
        ));
        assert!(matches!(
            TemplateExpander::expand_lines(&lines, dec!(1), &PercentOverrides::from([(1, dec!(0))])),
            Err(TemplateError::InvalidPercent { line: 1, .. })
        ));
    }

    #[test]
    fn test_percent_finer_than_storage_rejected() {
        let lines = vec![
            line(dec!(33.33333), dec!(0)),
            line(dec!(33.33333), dec!(0)),
            line(dec!(33.33334), dec!(0)),
            line(dec!(0), dec!(100)),
        ];
        assert!(matches!(
            TemplateExpander::expand_lines(&lines, dec!(100), &PercentOverrides::new()),
            Err(TemplateError::PercentTooPrecise { line: 0, .. })
        ));

        let four_places = vec![
            line(dec!(33.3333), dec!(0)),
            line(dec!(33.3333), dec!(0)),
            line(dec!(33.3334), dec!(0)),
            line(dec!(0), dec!(100.0000)),
        ];
        assert!(
            TemplateExpander::expand_lines(&four_places, dec!(100), &PercentOverrides::new())
                .is_ok()
        );
    }

    #[test]
    fn test_override_finer_than_storage_rejected() {
        let lines = vec![
            variable(line(dec!(50), dec!(0))),
            variable(line(dec!(50), dec!(0))),
            line(dec!(0), dec!(100)),
        ];
        let overrides = PercentOverrides::from([(0, dec!(40.00001)), (1, dec!(59.99999))]);
        assert!(matches!(
            TemplateExpander::expand_lines(&lines, dec!(100), &overrides),
            Err(TemplateError::PercentTooPrecise { line: 0, .. })
        ));
    }

    #[test]
    fn test_oversized_total_rejected() {
        let lines = vec![line(dec!(100), dec!(0)), line(dec!(0), dec!(100))];
        for total in [dec!(100000000000000000), dec!(1000000000000000000000000000)] {
            assert!(matches!(
                TemplateExpander::expand_lines(&lines, total, &PercentOverrides::new()),
                Err(TemplateError::AmountTooLarge(_))
            ));
        }
        assert!(
            TemplateExpander::expand_lines(&lines, dec!(99999999999999999.99), &PercentOverrides::new())
                .is_ok()
        );
    }

    #[test]
    fn test_inactive_template_rejected() {
        let mut t = template(vec![line(dec!(100), dec!(0)), line(dec!(0), dec!(100))]);
        t.is_active = false;
        assert!(matches!(
            TemplateExpander::expand(&t, dec!(10), &PercentOverrides::new()),
            Err(TemplateError::Inactive(_))
        ));
    }

    #[test]
    fn test_validate_definition() {
        let good = CreateTemplateInput {
            name: "Payroll".to_string(),
            category: "payroll".to_string(),
            description: None,
            lines: vec![line(dec!(100), dec!(0)), line(dec!(0), dec!(100))],
            created_by: None,
        };
        assert!(TemplateExpander::validate_definition(&good).is_ok());

        let mut bad = good.clone();
        bad.lines.push(line(dec!(10), dec!(10)));
        assert!(matches!(
            TemplateExpander::validate_definition(&bad),
            Err(TemplateError::InvalidLine { line: 2 })
        ));

        let mut precise = good.clone();
        precise.lines = vec![
            line(dec!(50.00005), dec!(0)),
            line(dec!(49.99995), dec!(0)),
            line(dec!(0), dec!(100)),
        ];
        assert!(matches!(
            TemplateExpander::validate_definition(&precise),
            Err(TemplateError::PercentTooPrecise { line: 0, .. })
        ));

        let mut unnamed = good;
        unnamed.name = String::new();
        assert!(matches!(
            TemplateExpander::validate_definition(&unnamed),
            Err(TemplateError::EmptyName)
        ));
    }

    #[test]
    fn test_analytical_and_description_carried_over() {
        let mut first = line(dec!(100), dec!(0));
        first.description = Some("Materials".to_string());
        let out = TemplateExpander::expand_lines(
            &[first, line(dec!(0), dec!(100))],
            dec!(5),
            &PercentOverrides::new(),
        )
        .unwrap();
        assert_eq!(out[0].description.as_deref(), Some("Materials"));
    }
}
