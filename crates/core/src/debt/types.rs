//! Debt types and derived status.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use kassa_shared::types::money::{is_cent_precise, is_storable};
use kassa_shared::types::{BusinessEventId, DebtId, DebtPaymentId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DebtError;
use crate::cash::CashFlow;

/// Who owes whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtDirection {
    /// We owe the counterparty; paying it reduces cash.
    Payable,
    /// The counterparty owes us; collecting it increases cash.
    Receivable,
}

impl DebtDirection {
    /// Returns the cash direction of a payment against a debt of this direction.
    #[must_use]
    pub const fn cash_flow(self) -> CashFlow {
        match self {
            Self::Payable => CashFlow::Outflow,
            Self::Receivable => CashFlow::Inflow,
        }
    }
}

/// Derived repayment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtStatus {
    /// Nothing paid yet.
    Open,
    /// Partially paid.
    Partial,
    /// Paid in full (or overpaid).
    Closed,
}

impl DebtStatus {
    /// Derives the status from the original and paid amounts.
    ///
    /// - `closed` if paid >= original
    /// - `partial` if 0 < paid < original
    /// - `open` otherwise
    #[must_use]
    pub fn from_amounts(original: Decimal, paid: Decimal) -> Self {
        if paid >= original {
            Self::Closed
        } else if paid > Decimal::ZERO {
            Self::Partial
        } else {
            Self::Open
        }
    }

    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Partial => "partial",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for DebtStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "partial" => Ok(Self::Partial),
            "closed" => Ok(Self::Closed),
            _ => Err(format!("Unknown debt status: {s}")),
        }
    }
}

/// A payable or receivable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    /// Unique identifier.
    pub id: DebtId,
    /// Payable or receivable.
    pub direction: DebtDirection,
    /// Supplier or customer name.
    pub counterparty: String,
    /// What the debt is for.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Amount originally owed.
    pub original_amount: Decimal,
    /// Sum of all payments so far; never decreases.
    pub amount_paid: Decimal,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Who recorded the debt.
    pub created_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last payment timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Debt {
    /// Returns the derived status.
    #[must_use]
    pub fn status(&self) -> DebtStatus {
        DebtStatus::from_amounts(self.original_amount, self.amount_paid)
    }

    /// Returns the current position of the debt.
    #[must_use]
    pub fn position(&self) -> DebtPosition {
        DebtPosition::new(self.id, self.original_amount, self.amount_paid)
    }

    /// Returns true if the debt is past due and not closed.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status() != DebtStatus::Closed && self.due_date.is_some_and(|due| due < today)
    }
}

/// Outstanding amount and status of a debt.
///
/// Outstanding never goes below zero; anything paid beyond the original
/// amount is reported as `overpaid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtPosition {
    /// The debt.
    pub debt_id: DebtId,
    /// Amount originally owed.
    pub original_amount: Decimal,
    /// Sum of payments.
    pub amount_paid: Decimal,
    /// Amount still owed, clamped at zero.
    pub outstanding: Decimal,
    /// Amount paid beyond the original.
    pub overpaid: Decimal,
    /// Derived status.
    pub status: DebtStatus,
}

impl DebtPosition {
    /// Computes the position from the original and paid amounts.
    #[must_use]
    pub fn new(debt_id: DebtId, original_amount: Decimal, amount_paid: Decimal) -> Self {
        let remaining = original_amount - amount_paid;
        Self {
            debt_id,
            original_amount,
            amount_paid,
            outstanding: remaining.max(Decimal::ZERO),
            overpaid: (-remaining).max(Decimal::ZERO),
            status: DebtStatus::from_amounts(original_amount, amount_paid),
        }
    }
}

/// Input for creating a debt.
#[derive(Debug, Clone)]
pub struct CreateDebtInput {
    /// Payable or receivable.
    pub direction: DebtDirection,
    /// Supplier or customer name.
    pub counterparty: String,
    /// What the debt is for.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Amount owed.
    pub original_amount: Decimal,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Who records the debt.
    pub created_by: Option<UserId>,
}

impl CreateDebtInput {
    /// Validates the input.
    ///
    /// # Errors
    ///
    /// Returns `EmptyField` or an amount error.
    pub fn validate(&self) -> Result<(), DebtError> {
        if self.counterparty.trim().is_empty() {
            return Err(DebtError::EmptyField("counterparty"));
        }
        if self.title.trim().is_empty() {
            return Err(DebtError::EmptyField("title"));
        }
        validate_amount(self.original_amount)
    }
}

/// Input for a payment against a debt.
#[derive(Debug, Clone)]
pub struct DebtPaymentInput {
    /// The debt being paid.
    pub debt_id: DebtId,
    /// Positive amount.
    pub amount: Decimal,
    /// Payment date.
    pub date: NaiveDate,
    /// Free-text comment.
    pub comment: String,
    /// Who records the payment.
    pub paid_by: Option<UserId>,
}

impl DebtPaymentInput {
    /// Validates the amount.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveAmount`, `SubCentAmount` or `AmountTooLarge`.
    pub fn validate(&self) -> Result<(), DebtError> {
        validate_amount(self.amount)
    }
}

/// A recorded payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtPayment {
    /// Unique identifier.
    pub id: DebtPaymentId,
    /// The debt paid.
    pub debt_id: DebtId,
    /// The business event that moved the cash.
    pub event_id: BusinessEventId,
    /// Amount paid.
    pub amount: Decimal,
    /// Payment date.
    pub date: NaiveDate,
    /// Free-text comment.
    pub comment: String,
    /// Recording timestamp.
    pub created_at: DateTime<Utc>,
}

fn validate_amount(amount: Decimal) -> Result<(), DebtError> {
    if amount <= Decimal::ZERO {
        return Err(DebtError::NonPositiveAmount(amount));
    }
    if !is_cent_precise(amount) {
        return Err(DebtError::SubCentAmount(amount));
    }
    if !is_storable(amount) {
        return Err(DebtError::AmountTooLarge(amount));
    }
    Ok(())
}
