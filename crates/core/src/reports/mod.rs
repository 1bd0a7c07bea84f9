//! Report generation.
//!
//! Pure assembly of report figures from pre-aggregated sums:
//! - Trial balance
//! - Account turnover statement
//! - Financial summary (income vs expenses)
//! - Cash dashboard

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
