//! Core ledger logic for Kassa.
//!
//! This crate contains pure business logic with ZERO database dependencies.
//! All domain types, validation rules, and calculations live here; the
//! persistence crate supplies lookups as closures.
//!
//! # Modules
//!
//! - `accounts` - Chart of accounts and analytical sub-accounts
//! - `assets` - Register of factory property
//! - `correspondence` - Allowed debit/credit account pairs
//! - `ledger` - Double-entry journal validation
//! - `templates` - Standard operation expansion
//! - `fiscal` - Financial periods and the posting gate
//! - `cash` - Operating cash account and business events
//! - `debt` - Payables and receivables
//! - `reports` - Trial balance, turnover and cash summaries

pub mod accounts;
pub mod assets;
pub mod cash;
pub mod correspondence;
pub mod debt;
pub mod fiscal;
pub mod ledger;
pub mod reports;
pub mod templates;
