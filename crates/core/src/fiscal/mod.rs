//! Financial period management.
//!
//! Periods are opt-in: a date covered by no period may always be posted to.

pub mod error;
pub mod period;

pub use error::PeriodError;
pub use period::{CreatePeriodInput, FinancialPeriod, PeriodManager, PeriodType};
