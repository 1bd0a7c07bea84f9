//! Expense category repository.

use std::collections::HashMap;

use chrono::Utc;
use kassa_core::cash::{CashError, CreateCategoryInput, ExpenseCategories, ExpenseCategory};
use kassa_shared::RetryConfig;
use kassa_shared::types::ExpenseCategoryId;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder, Set,
    TransactionTrait,
};

use crate::entities::expense_categories;
use crate::error::RepositoryResult;
use crate::retry::with_retry;

const LOCK_CATEGORY_TREE: &str = "LOCK TABLE expense_categories IN SHARE ROW EXCLUSIVE MODE";

type ParentMap = HashMap<ExpenseCategoryId, Option<ExpenseCategoryId>>;

/// Expense category repository.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    db: DatabaseConnection,
    retry: RetryConfig,
}

impl CategoryRepository {
    /// Creates a new category repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            retry: RetryConfig::default(),
        }
    }

    /// Sets the retry budget for serialization conflicts.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns `CashError::EmptyField` for a blank name or
    /// `CategoryNotFound` for an unknown parent.
    pub async fn create_category(&self, input: CreateCategoryInput) -> RepositoryResult<ExpenseCategory> {
        let tree = parents(&self.db).await?;
        ExpenseCategories::validate_new(&input, |id| tree.get(&id).copied())?;

        let model = expense_categories::ActiveModel {
            id: Set(ExpenseCategoryId::new().into_inner()),
            name: Set(input.name.trim().to_string()),
            description: Set(input.description),
            parent_id: Set(input.parent_id.map(ExpenseCategoryId::into_inner)),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(category_id = %model.id, name = %model.name, "Expense category created");
        Ok(to_category(model))
    }

    /// Moves a category under a new parent, or to the root with `None`.
    ///
    /// The category table is locked for the whole check-and-update.
    ///
    /// # Errors
    ///
    /// Returns `CategoryNotFound` or `CategoryCycle`.
    pub async fn set_parent(
        &self,
        id: ExpenseCategoryId,
        new_parent: Option<ExpenseCategoryId>,
    ) -> RepositoryResult<ExpenseCategory> {
        let updated = with_retry(&self.retry, move || async move {
            let txn = self.db.begin().await?;
            txn.execute_unprepared(LOCK_CATEGORY_TREE).await?;
            let updated = move_category(&txn, id, new_parent).await?;
            txn.commit().await?;
            Ok(updated)
        })
        .await?;

        tracing::info!(category_id = %id, parent_id = ?new_parent, "Expense category moved");
        Ok(to_category(updated))
    }

    /// Gets a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `CashError::CategoryNotFound` if the category does not exist.
    pub async fn get_category(&self, id: ExpenseCategoryId) -> RepositoryResult<ExpenseCategory> {
        let model = expense_categories::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(CashError::CategoryNotFound(id))?;
        Ok(to_category(model))
    }

    /// Lists all categories by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_categories(&self) -> RepositoryResult<Vec<ExpenseCategory>> {
        let models = expense_categories::Entity::find()
            .order_by_asc(expense_categories::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(to_category).collect())
    }
}

async fn move_category<C: ConnectionTrait>(
    conn: &C,
    id: ExpenseCategoryId,
    new_parent: Option<ExpenseCategoryId>,
) -> RepositoryResult<expense_categories::Model> {
    let model = expense_categories::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .ok_or(CashError::CategoryNotFound(id))?;

    if let Some(parent) = new_parent {
        let tree = parents(conn).await?;
        ExpenseCategories::validate_parent(id, parent, |c| tree.get(&c).copied())?;
    }

    let mut active: expense_categories::ActiveModel = model.into();
    active.parent_id = Set(new_parent.map(ExpenseCategoryId::into_inner));
    Ok(active.update(conn).await?)
}

/// Maps every category to its parent.
async fn parents<C: ConnectionTrait>(conn: &C) -> RepositoryResult<ParentMap> {
    let models = expense_categories::Entity::find().all(conn).await?;
    Ok(models
        .into_iter()
        .map(|m| {
            (
                ExpenseCategoryId::from_uuid(m.id),
                m.parent_id.map(ExpenseCategoryId::from_uuid),
            )
        })
        .collect())
}

fn to_category(model: expense_categories::Model) -> ExpenseCategory {
    ExpenseCategory {
        id: ExpenseCategoryId::from_uuid(model.id),
        name: model.name,
        description: model.description,
        parent_id: model.parent_id.map(ExpenseCategoryId::from_uuid),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
