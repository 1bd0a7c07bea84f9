//! `SeaORM` entity definitions.
//!
//! One module per table, matching the schema created by the migration.

#![allow(missing_docs)]

pub mod accounts;
pub mod analytical_accounts;
pub mod business_events;
pub mod cash_accounts;
pub mod correspondence_pairs;
pub mod debt_payments;
pub mod debts;
pub mod expense_categories;
pub mod factory_assets;
pub mod financial_periods;
pub mod journal_entries;
pub mod journal_lines;
pub mod sea_orm_active_enums;
pub mod standard_operation_lines;
pub mod standard_operations;
