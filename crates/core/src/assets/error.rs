//! Asset register errors.

use chrono::NaiveDate;
use kassa_shared::types::AssetId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the asset register.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Asset not found.
    #[error("Asset not found: {0}")]
    NotFound(AssetId),

    /// Asset has been written off.
    #[error("Asset {0} is no longer active")]
    Inactive(AssetId),

    /// A required text field is blank.
    #[error("Field {0} cannot be empty")]
    EmptyField(&'static str),

    /// A price or value is below zero.
    #[error("{field} cannot be negative, got {amount}")]
    NegativeValue {
        /// Which value.
        field: &'static str,
        /// The rejected amount.
        amount: Decimal,
    },

    /// A price or value has precision finer than one cent.
    #[error("{field} must be whole cents, got {amount}")]
    SubCentAmount {
        /// Which value.
        field: &'static str,
        /// The rejected amount.
        amount: Decimal,
    },

    /// A price or value does not fit a stored money column.
    #[error("{field} {amount} exceeds the storable maximum")]
    AmountTooLarge {
        /// Which value.
        field: &'static str,
        /// The rejected amount.
        amount: Decimal,
    },

    /// Warranty ends before the asset was bought.
    #[error("Warranty expiry {warranty_expiry} is before purchase date {purchase_date}")]
    WarrantyBeforePurchase {
        /// Purchase date.
        purchase_date: NaiveDate,
        /// Warranty expiry.
        warranty_expiry: NaiveDate,
    },
}

impl AssetError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "ASSET_NOT_FOUND",
            Self::Inactive(_) => "ASSET_INACTIVE",
            Self::EmptyField(_) => "EMPTY_FIELD",
            Self::NegativeValue { .. } => "NEGATIVE_VALUE",
            Self::SubCentAmount { .. } => "SUB_CENT_AMOUNT",
            Self::AmountTooLarge { .. } => "AMOUNT_TOO_LARGE",
            Self::WarrantyBeforePurchase { .. } => "WARRANTY_BEFORE_PURCHASE",
        }
    }
}
