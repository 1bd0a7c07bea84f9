//! Money type with decimal precision and currency.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` for arbitrary precision.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places stored for every currency amount.
pub const MONEY_SCALE: u32 = 2;

/// Rounds an amount to cents using half-up (away from zero on a tie).
///
/// This is the single rounding rule used for currency amounts across the
/// ledger, including standard operation expansion.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Digits allowed before the decimal point of a stored amount (`NUMERIC(19, 2)`).
pub const MAX_INTEGER_DIGITS: u32 = 17;

/// Returns true if the amount fits a stored money column.
#[must_use]
pub fn is_storable(amount: Decimal) -> bool {
    amount.abs() < Decimal::from(10_i64.pow(MAX_INTEGER_DIGITS))
}

/// Returns true if the amount carries no precision finer than one cent.
#[must_use]
pub fn is_cent_precise(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE
}

/// Represents a monetary amount with currency.
///
/// Uses `Decimal` internally to avoid floating-point precision errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount in major units with two decimal places (e.g., 100.50).
    pub amount: Decimal,
    /// ISO 4217 currency code (e.g., "KGS", "USD").
    pub currency: Currency,
}

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Kyrgyzstani Som (the factory's operating currency).
    #[default]
    Kgs,
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// Russian Ruble
    Rub,
    /// Kazakhstani Tenge
    Kzt,
}

impl Currency {
    /// Returns the ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Kgs => "KGS",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Rub => "RUB",
            Self::Kzt => "KZT",
        }
    }

    /// Parses an ISO 4217 code, case-insensitively.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "KGS" => Some(Self::Kgs),
            "USD" => Some(Self::Usd),
            "EUR" => Some(Self::Eur),
            "RUB" => Some(Self::Rub),
            "KZT" => Some(Self::Kzt),
            _ => None,
        }
    }
}

impl Money {
    /// Creates a new Money instance.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Returns the same money rounded to cents.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            amount: round_money(self.amount),
            currency: self.currency,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "KGS" => Ok(Self::Kgs),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "RUB" => Ok(Self::Rub),
            "KZT" => Ok(Self::Kzt),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}
