//! Standard operation errors.

use kassa_shared::types::StandardOperationId;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::ledger::EntrySide;

/// Errors raised while defining or expanding a standard operation.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template name is empty.
    #[error("Template name cannot be empty")]
    EmptyName,

    /// Template has no lines.
    #[error("Template must have at least one line")]
    EmptyTemplate,

    /// A line does not have exactly one positive percent side.
    #[error("Template line {line} must have exactly one positive percent")]
    InvalidLine {
        /// Zero-based line index.
        line: usize,
    },

    /// Percents on one side do not add up to 100.
    #[error("{side:?} percents sum to {sum}, expected 100")]
    PercentSum {
        /// The offending side.
        side: EntrySide,
        /// The actual sum.
        sum: Decimal,
    },

    /// Total amount is zero or negative.
    #[error("Total amount must be positive, got {0}")]
    NonPositiveTotal(Decimal),

    /// Override refers to a line index that does not exist.
    #[error("Template has no line {0}")]
    UnknownLine(usize),

    /// Override targets a fixed line.
    #[error("Template line {0} is not variable")]
    NotVariable(usize),

    /// Override percent is outside (0, 100].
    #[error("Invalid percent {percent} for line {line}")]
    InvalidPercent {
        /// Zero-based line index.
        line: usize,
        /// The rejected percent.
        percent: Decimal,
    },

    /// A percent has more decimal places than a stored split keeps.
    #[error("Percent {percent} for line {line} has more than 4 decimal places")]
    PercentTooPrecise {
        /// Zero-based line index.
        line: usize,
        /// The rejected percent.
        percent: Decimal,
    },

    /// Total amount does not fit a stored money column.
    #[error("Total amount {0} exceeds the storable maximum")]
    AmountTooLarge(Decimal),

    /// After rounding correction a line would be zero or negative.
    #[error("Line {line} rounds to a non-positive amount")]
    DegenerateLine {
        /// Zero-based line index.
        line: usize,
    },

    /// Template is deactivated.
    #[error("Standard operation {0} is inactive")]
    Inactive(StandardOperationId),

    /// Template not found.
    #[error("Standard operation not found: {0}")]
    NotFound(StandardOperationId),
}

impl TemplateError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyName => "EMPTY_TEMPLATE_NAME",
            Self::EmptyTemplate => "EMPTY_TEMPLATE",
            Self::InvalidLine { .. } => "INVALID_TEMPLATE_LINE",
            Self::PercentSum { .. } => "TEMPLATE_PERCENT_SUM",
            Self::NonPositiveTotal(_) => "NON_POSITIVE_TOTAL",
            Self::UnknownLine(_) => "UNKNOWN_TEMPLATE_LINE",
            Self::NotVariable(_) => "TEMPLATE_LINE_NOT_VARIABLE",
            Self::InvalidPercent { .. } => "INVALID_PERCENT",
            Self::PercentTooPrecise { .. } => "PERCENT_TOO_PRECISE",
            Self::AmountTooLarge(_) => "AMOUNT_TOO_LARGE",
            Self::DegenerateLine { .. } => "DEGENERATE_LINE",
            Self::Inactive(_) => "TEMPLATE_INACTIVE",
            Self::NotFound(_) => "TEMPLATE_NOT_FOUND",
        }
    }
}
