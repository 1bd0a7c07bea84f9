//! Cash account and business event types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use kassa_shared::types::money::{is_cent_precise, is_storable};
use kassa_shared::types::{BusinessEventId, Currency, DebtId, ExpenseCategoryId, Money, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::CashError;

/// Primary key of the single cash account row.
pub const CASH_ACCOUNT_ID: i32 = 1;

/// The operating cash account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashAccount {
    /// Current balance.
    pub balance: Decimal,
    /// Currency of the balance.
    pub currency: Currency,
    /// Free-text description.
    pub description: String,
    /// Last time the balance changed.
    pub updated_at: DateTime<Utc>,
}

impl CashAccount {
    /// The balance with its currency.
    #[must_use]
    pub const fn money(&self) -> Money {
        Money::new(self.balance, self.currency)
    }
}

/// Direction of a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashFlow {
    /// Money comes in.
    Inflow,
    /// Money goes out.
    Outflow,
}

impl CashFlow {
    /// Returns `amount` signed for this direction.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Inflow => amount,
            Self::Outflow => -amount,
        }
    }
}

/// Kind of business event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Owner puts money into the business.
    Deposit,
    /// Money taken out of the business.
    Withdrawal,
    /// Operating expense.
    Expense,
    /// Income from sales or other sources.
    Income,
    /// Payment against a payable or receivable.
    DebtPayment,
}

impl EventKind {
    /// Returns the snake_case name used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Expense => "expense",
            Self::Income => "income",
            Self::DebtPayment => "debt_payment",
        }
    }

    /// Returns the cash direction for kinds whose direction is fixed.
    ///
    /// Debt payments return `None`; their direction comes from the debt.
    #[must_use]
    pub const fn fixed_flow(self) -> Option<CashFlow> {
        match self {
            Self::Deposit | Self::Income => Some(CashFlow::Inflow),
            Self::Withdrawal | Self::Expense => Some(CashFlow::Outflow),
            Self::DebtPayment => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            "debt_payment" => Ok(Self::DebtPayment),
            _ => Err(format!("Unknown event kind: {s}")),
        }
    }
}

/// Source of an income event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeType {
    /// Product sales.
    Sales,
    /// Everything else.
    Other,
}

impl IncomeType {
    /// Returns the lowercase name used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Other => "other",
        }
    }
}

impl FromStr for IncomeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sales" => Ok(Self::Sales),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown income type: {s}")),
        }
    }
}

/// Kind-specific event metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventDetails {
    /// Money put into the business.
    Deposit {
        /// Free-text comment.
        #[serde(default)]
        comment: String,
    },
    /// Money taken out of the business.
    Withdrawal {
        /// Free-text comment.
        #[serde(default)]
        comment: String,
    },
    /// Operating expense.
    Expense {
        /// Expense category.
        category_id: ExpenseCategoryId,
        /// What the money was spent on.
        description: String,
        /// Supplier name.
        #[serde(default)]
        supplier: Option<String>,
        /// Supplier invoice number.
        #[serde(default)]
        invoice_number: Option<String>,
        /// How it was paid.
        #[serde(default)]
        payment_method: Option<String>,
    },
    /// Income.
    Income {
        /// Source of the income.
        income_type: IncomeType,
        /// What the income is for.
        description: String,
        /// Related order reference.
        #[serde(default)]
        order_reference: Option<String>,
    },
    /// Payment against a debt.
    DebtPayment {
        /// The debt being paid.
        debt_id: DebtId,
        /// Free-text comment.
        #[serde(default)]
        comment: String,
    },
}

impl EventDetails {
    /// Returns the event kind these details belong to.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Deposit { .. } => EventKind::Deposit,
            Self::Withdrawal { .. } => EventKind::Withdrawal,
            Self::Expense { .. } => EventKind::Expense,
            Self::Income { .. } => EventKind::Income,
            Self::DebtPayment { .. } => EventKind::DebtPayment,
        }
    }

    /// Returns the expense category, for expense events.
    #[must_use]
    pub const fn category_id(&self) -> Option<ExpenseCategoryId> {
        match self {
            Self::Expense { category_id, .. } => Some(*category_id),
            _ => None,
        }
    }

    /// Returns the income type, for income events.
    #[must_use]
    pub const fn income_type(&self) -> Option<IncomeType> {
        match self {
            Self::Income { income_type, .. } => Some(*income_type),
            _ => None,
        }
    }

    /// Returns the debt being paid, for debt payment events.
    #[must_use]
    pub const fn debt_id(&self) -> Option<DebtId> {
        match self {
            Self::DebtPayment { debt_id, .. } => Some(*debt_id),
            _ => None,
        }
    }

    /// Validates required fields.
    ///
    /// # Errors
    ///
    /// Returns `CashError::EmptyField` for a blank required description.
    pub fn validate(&self) -> Result<(), CashError> {
        match self {
            Self::Expense { description, .. } | Self::Income { description, .. }
                if description.trim().is_empty() =>
            {
                Err(CashError::EmptyField("description"))
            }
            _ => Ok(()),
        }
    }

    /// Validates that `self` may replace `existing` on a stored event.
    ///
    /// The kind is fixed, and a payment stays attached to its debt.
    ///
    /// # Errors
    ///
    /// Returns `KindMismatch`, `DebtReassignment` or a field error.
    pub fn validate_replacement(&self, existing: &Self) -> Result<(), CashError> {
        if self.kind() != existing.kind() {
            return Err(CashError::KindMismatch {
                expected: existing.kind(),
                actual: self.kind(),
            });
        }
        if let (Self::DebtPayment { debt_id: new, .. }, Self::DebtPayment { debt_id: old, .. }) =
            (self, existing)
            && new != old
        {
            return Err(CashError::DebtReassignment);
        }
        self.validate()
    }
}

/// Input for recording a business event.
#[derive(Debug, Clone)]
pub struct RecordEventInput {
    /// Positive amount; the sign comes from the kind.
    pub amount: Decimal,
    /// Business date of the event.
    pub date: NaiveDate,
    /// The user recording the event.
    pub recorded_by: Option<UserId>,
    /// Kind-specific metadata.
    pub details: EventDetails,
}

impl RecordEventInput {
    /// Returns the event kind.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.details.kind()
    }

    /// Validates the amount and metadata.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveAmount`, `SubCentAmount` or a field error.
    pub fn validate(&self) -> Result<(), CashError> {
        validate_amount(self.amount)?;
        self.details.validate()
    }
}

/// Validates a positive, cent-precise amount.
///
/// # Errors
///
/// Returns `NonPositiveAmount`, `SubCentAmount` or `AmountTooLarge`.
pub fn validate_amount(amount: Decimal) -> Result<(), CashError> {
    if amount <= Decimal::ZERO {
        return Err(CashError::NonPositiveAmount(amount));
    }
    if !is_cent_precise(amount) {
        return Err(CashError::SubCentAmount(amount));
    }
    if !is_storable(amount) {
        return Err(CashError::AmountTooLarge(amount));
    }
    Ok(())
}

/// A recorded business event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessEvent {
    /// Unique identifier.
    pub id: BusinessEventId,
    /// Event kind.
    pub kind: EventKind,
    /// Positive amount.
    pub amount: Decimal,
    /// Signed change applied to the cash balance when the event was recorded.
    pub cash_delta: Decimal,
    /// Business date.
    pub date: NaiveDate,
    /// The user who recorded the event.
    pub recorded_by: Option<UserId>,
    /// Kind-specific metadata.
    pub details: EventDetails,
    /// When the event was recorded.
    pub created_at: DateTime<Utc>,
    /// When the metadata was last edited.
    pub updated_at: DateTime<Utc>,
}
