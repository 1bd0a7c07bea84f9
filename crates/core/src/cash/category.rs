//! Hierarchical expense categories.

use chrono::{DateTime, Utc};
use kassa_shared::types::ExpenseCategoryId;
use serde::{Deserialize, Serialize};

use super::error::CashError;

/// Upper bound on parent hops; anything deeper is treated as corrupt data.
const MAX_DEPTH: usize = 64;

/// An expense category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseCategory {
    /// Unique identifier.
    pub id: ExpenseCategoryId,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Parent category, if any.
    pub parent_id: Option<ExpenseCategoryId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional parent.
    pub parent_id: Option<ExpenseCategoryId>,
}

/// Pure validation for the category tree.
pub struct ExpenseCategories;

impl ExpenseCategories {
    /// Validates a new category.
    ///
    /// `parent_of` returns `Some(parent)` for known categories and `None`
    /// for unknown ones.
    ///
    /// # Errors
    ///
    /// Returns `EmptyField` or `CategoryNotFound`.
    pub fn validate_new<L>(input: &CreateCategoryInput, parent_of: L) -> Result<(), CashError>
    where
        L: Fn(ExpenseCategoryId) -> Option<Option<ExpenseCategoryId>>,
    {
        if input.name.trim().is_empty() {
            return Err(CashError::EmptyField("name"));
        }
        if let Some(parent) = input.parent_id {
            parent_of(parent).ok_or(CashError::CategoryNotFound(parent))?;
        }
        Ok(())
    }

    /// Validates that `category` may be placed under `new_parent`.
    ///
    /// # Errors
    ///
    /// Returns `CategoryCycle` if `category` is `new_parent` or one of its
    /// ancestors, or `CategoryNotFound` for a missing ancestor.
    pub fn validate_parent<L>(
        category: ExpenseCategoryId,
        new_parent: ExpenseCategoryId,
        parent_of: L,
    ) -> Result<(), CashError>
    where
        L: Fn(ExpenseCategoryId) -> Option<Option<ExpenseCategoryId>>,
    {
        let mut current = Some(new_parent);
        for _ in 0..MAX_DEPTH {
            let Some(id) = current else {
                return Ok(());
            };
            if id == category {
                break;
            }
            current = parent_of(id).ok_or(CashError::CategoryNotFound(id))?;
        }

        Err(CashError::CategoryCycle {
            category,
            parent: new_parent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_new_category_with_unknown_parent() {
        let input = CreateCategoryInput {
            name: "Glass".to_string(),
            description: None,
            parent_id: Some(ExpenseCategoryId::new()),
        };
        assert!(matches!(
            ExpenseCategories::validate_new(&input, |_| None),
            Err(CashError::CategoryNotFound(_))
        ));
    }

    #[test]
    fn test_new_root_category() {
        let input = CreateCategoryInput {
            name: "Materials".to_string(),
            description: Some("Raw materials".to_string()),
            parent_id: None,
        };
        assert!(ExpenseCategories::validate_new(&input, |_| None).is_ok());
    }

    #[test]
    fn test_cycle_detected() {
        let (materials, glass, tempered) = (
            ExpenseCategoryId::new(),
            ExpenseCategoryId::new(),
            ExpenseCategoryId::new(),
        );
        let tree: HashMap<_, _> = [
            (materials, None),
            (glass, Some(materials)),
            (tempered, Some(glass)),
        ]
        .into_iter()
        .collect();

        assert!(matches!(
            ExpenseCategories::validate_parent(materials, tempered, |id| tree.get(&id).copied()),
            Err(CashError::CategoryCycle { .. })
        ));
        assert!(matches!(
            ExpenseCategories::validate_parent(glass, glass, |id| tree.get(&id).copied()),
            Err(CashError::CategoryCycle { .. })
        ));
    }

    #[test]
    fn test_sibling_move_allowed() {
        let (materials, glass, paint) = (
            ExpenseCategoryId::new(),
            ExpenseCategoryId::new(),
            ExpenseCategoryId::new(),
        );
        let tree: HashMap<_, _> = [(materials, None), (glass, Some(materials)), (paint, Some(materials))]
            .into_iter()
            .collect();

        assert!(ExpenseCategories::validate_parent(paint, glass, |id| tree.get(&id).copied()).is_ok());
    }
}
