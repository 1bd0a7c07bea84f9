//! Operating cash account and the business events that move it.
//!
//! Every event carries a signed cash effect that is applied exactly once,
//! when the event is first recorded.

pub mod category;
pub mod error;
pub mod types;

pub use category::{CreateCategoryInput, ExpenseCategories, ExpenseCategory};
pub use error::CashError;
pub use types::{
    BusinessEvent, CASH_ACCOUNT_ID, CashAccount, CashFlow, EventDetails, EventKind, IncomeType,
    RecordEventInput, validate_amount,
};
