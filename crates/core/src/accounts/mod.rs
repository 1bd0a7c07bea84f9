//! Chart of accounts.
//!
//! Accounts form a tree through their optional parent. Analytical accounts
//! hang off a single parent account and only ever tag journal lines.

pub mod directory;
pub mod error;
pub mod types;

pub use directory::{AccountDirectory, ParentLink};
pub use error::AccountError;
pub use types::{
    Account, AccountType, AnalyticalAccount, CreateAccountInput, CreateAnalyticalAccountInput,
    NormalSide,
};
