//! Account turnover calculations.
//!
//! Balances are signed by the account's normal side:
//! - Debit-normal: balance = debit - credit
//! - Credit-normal: balance = credit - debit

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accounts::NormalSide;

/// Movement of one account over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turnover {
    /// Balance before the range.
    pub opening_balance: Decimal,
    /// Debits inside the range.
    pub debit_turnover: Decimal,
    /// Credits inside the range.
    pub credit_turnover: Decimal,
    /// Balance at the end of the range.
    pub closing_balance: Decimal,
}

impl Turnover {
    /// Builds a turnover from raw sums.
    ///
    /// `before` holds (debit, credit) posted before the range, `within` the
    /// sums posted inside it.
    #[must_use]
    pub fn from_sums(
        normal_side: NormalSide,
        before: (Decimal, Decimal),
        within: (Decimal, Decimal),
    ) -> Self {
        let opening_balance = normal_side.balance_change(before.0, before.1);
        Self {
            opening_balance,
            debit_turnover: within.0,
            credit_turnover: within.1,
            closing_balance: opening_balance + normal_side.balance_change(within.0, within.1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_turnover_from_sums() {
        let t = Turnover::from_sums(
            NormalSide::Debit,
            (dec!(1000), dec!(400)),
            (dec!(250), dec!(50)),
        );
        assert_eq!(t.opening_balance, dec!(600));
        assert_eq!(t.debit_turnover, dec!(250));
        assert_eq!(t.credit_turnover, dec!(50));
        assert_eq!(t.closing_balance, dec!(800));
    }

    #[test]
    fn test_credit_normal_turnover() {
        let t = Turnover::from_sums(
            NormalSide::Credit,
            (dec!(100), dec!(300)),
            (dec!(20), dec!(0)),
        );
        assert_eq!(t.opening_balance, dec!(200));
        assert_eq!(t.closing_balance, dec!(180));
    }

    /// Strategy for non-negative cent amounts.
    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Closing balance equals opening plus the signed movement, on either side.
        #[test]
        fn prop_closing_equals_opening_plus_movement(
            bd in amount_strategy(),
            bc in amount_strategy(),
            wd in amount_strategy(),
            wc in amount_strategy(),
            debit_normal in any::<bool>(),
        ) {
            let side = if debit_normal { NormalSide::Debit } else { NormalSide::Credit };
            let t = Turnover::from_sums(side, (bd, bc), (wd, wc));

            prop_assert_eq!(
                t.closing_balance,
                side.balance_change(bd + wd, bc + wc)
            );
        }

        /// Swapping the normal side negates the balance.
        #[test]
        fn prop_normal_side_mirrors_balance(
            debit in amount_strategy(),
            credit in amount_strategy(),
        ) {
            prop_assert_eq!(
                NormalSide::Debit.balance_change(debit, credit),
                -NormalSide::Credit.balance_change(debit, credit)
            );
        }
    }
}
