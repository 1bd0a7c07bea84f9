//! Payables and receivables.
//!
//! A debt accumulates payments; each payment also moves the cash balance in
//! the direction implied by the debt.

pub mod error;
pub mod types;

pub use error::DebtError;
pub use types::{
    CreateDebtInput, Debt, DebtDirection, DebtPayment, DebtPaymentInput, DebtPosition, DebtStatus,
};
