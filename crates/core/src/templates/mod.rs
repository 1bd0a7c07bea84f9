//! Standard operation templates.
//!
//! A template is a list of percentage lines that expands a total amount into
//! a balanced set of journal lines.

pub mod error;
pub mod expansion;
pub mod types;

#[cfg(test)]
mod expansion_props;

pub use error::TemplateError;
pub use expansion::TemplateExpander;
pub use types::{
    CreateTemplateInput, PercentOverrides, StandardOperation, StandardOperationLine,
    TemplateLineInput,
};
