//! Account directory repository: chart of accounts and analytical accounts.

use std::collections::HashMap;

use chrono::Utc;
use kassa_core::accounts::{
    Account, AccountDirectory, AccountError, AnalyticalAccount, CreateAccountInput,
    CreateAnalyticalAccountInput, ParentLink,
};
use kassa_shared::RetryConfig;
use kassa_shared::types::{AccountId, AnalyticalAccountId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{accounts, analytical_accounts};
use crate::error::RepositoryResult;
use crate::retry::{is_unique_violation, with_retry};

/// Serializes tree moves against each other and against account inserts,
/// without blocking the row locks taken by posting.
const LOCK_ACCOUNT_TREE: &str = "LOCK TABLE accounts IN SHARE ROW EXCLUSIVE MODE";

/// Account directory repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
    retry: RetryConfig,
}

impl AccountRepository {
    /// Creates a new account repository.
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

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError` for an invalid code or name, a duplicate code,
    /// or a missing/inactive parent.
    pub async fn create_account(&self, input: CreateAccountInput) -> RepositoryResult<Account> {
        let parent = match input.parent_id {
            Some(parent_id) => accounts::Entity::find_by_id(parent_id.into_inner())
                .one(&self.db)
                .await?,
            None => None,
        };

        AccountDirectory::validate_new_account(&input, |id| {
            parent
                .as_ref()
                .filter(|p| p.id == id.into_inner())
                .map(parent_link)
        })?;

        if self.find_by_code(&input.code).await?.is_some() {
            return Err(AccountError::DuplicateCode(input.code).into());
        }

        let now = Utc::now().into();
        let inserted = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            code: Set(input.code.clone()),
            name: Set(input.name.trim().to_string()),
            account_type: Set(input.account_type.into()),
            normal_side: Set(input.resolved_normal_side().into()),
            parent_id: Set(input.parent_id.map(AccountId::into_inner)),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await;
        // A concurrent insert of the same code can slip past the lookup above.
        let model = match inserted {
            Err(e) if is_unique_violation(&e) => {
                return Err(AccountError::DuplicateCode(input.code).into());
            }
            other => other?,
        };

        tracing::info!(account_id = %model.id, code = %model.code, "Account created");
        Ok(to_account(model))
    }

    /// Creates an analytical (cost-center) account under an existing account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError` for an invalid code or name, a duplicate code,
    /// or a missing owning account.
    pub async fn create_analytical_account(
        &self,
        input: CreateAnalyticalAccountInput,
    ) -> RepositoryResult<AnalyticalAccount> {
        let owner = accounts::Entity::find_by_id(input.parent_account_id.into_inner())
            .one(&self.db)
            .await?;

        AccountDirectory::validate_new_analytical(&input, |id| {
            owner
                .as_ref()
                .filter(|p| p.id == id.into_inner())
                .map(parent_link)
        })?;

        let duplicate = analytical_accounts::Entity::find()
            .filter(analytical_accounts::Column::Code.eq(&input.code))
            .one(&self.db)
            .await?;
        if duplicate.is_some() {
            return Err(AccountError::DuplicateCode(input.code).into());
        }

        let inserted = analytical_accounts::ActiveModel {
            id: Set(AnalyticalAccountId::new().into_inner()),
            code: Set(input.code.clone()),
            name: Set(input.name.trim().to_string()),
            parent_account_id: Set(input.parent_account_id.into_inner()),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await;
        let model = match inserted {
            Err(e) if is_unique_violation(&e) => {
                return Err(AccountError::DuplicateCode(input.code).into());
            }
            other => other?,
        };

        tracing::info!(
            analytical_account_id = %model.id,
            parent_account_id = %model.parent_account_id,
            "Analytical account created"
        );
        Ok(to_analytical(model))
    }

    /// Finds an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: AccountId) -> RepositoryResult<Option<Account>> {
        let model = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?;
        Ok(model.map(to_account))
    }

    /// Finds an account by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Account>> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::Code.eq(code))
            .one(&self.db)
            .await?;
        Ok(model.map(to_account))
    }

    /// Lists accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(&self, include_inactive: bool) -> RepositoryResult<Vec<Account>> {
        let mut query = accounts::Entity::find();
        if !include_inactive {
            query = query.filter(accounts::Column::IsActive.eq(true));
        }
        let models = query
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(to_account).collect())
    }

    /// Lists analytical accounts, optionally only those under one account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_analytical_accounts(
        &self,
        parent: Option<AccountId>,
    ) -> RepositoryResult<Vec<AnalyticalAccount>> {
        let mut query = analytical_accounts::Entity::find();
        if let Some(parent) = parent {
            query = query
                .filter(analytical_accounts::Column::ParentAccountId.eq(parent.into_inner()));
        }
        let models = query
            .order_by_asc(analytical_accounts::Column::Code)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(to_analytical).collect())
    }

    /// Marks an account inactive. Posted history is kept; new lines are refused.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if the account does not exist.
    pub async fn deactivate_account(&self, id: AccountId) -> RepositoryResult<Account> {
        let model = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(id))?;

        let mut active: accounts::ActiveModel = model.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&self.db).await?;

        tracing::info!(account_id = %id, "Account deactivated");
        Ok(to_account(updated))
    }

    /// Moves an account under a new parent, or to the root with `None`.
    ///
    /// The tree is locked for the whole check-and-update, so two opposing
    /// moves cannot both pass the cycle check.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::CycleDetected` if the move would create a
    /// cycle, or `NotFound`/`ParentInactive` for a bad parent.
    pub async fn set_parent(
        &self,
        id: AccountId,
        new_parent: Option<AccountId>,
    ) -> RepositoryResult<Account> {
        let updated = with_retry(&self.retry, move || async move {
            let txn = self.db.begin().await?;
            txn.execute_unprepared(LOCK_ACCOUNT_TREE).await?;
            let updated = move_account(&txn, id, new_parent).await?;
            txn.commit().await?;
            Ok(updated)
        })
        .await?;

        tracing::info!(account_id = %id, parent_id = ?new_parent, "Account moved");
        Ok(to_account(updated))
    }
}

async fn move_account<C: ConnectionTrait>(
    conn: &C,
    id: AccountId,
    new_parent: Option<AccountId>,
) -> RepositoryResult<accounts::Model> {
    let model = accounts::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .ok_or(AccountError::NotFound(id))?;

    if let Some(parent) = new_parent {
        let tree = parent_links(conn).await?;
        let link = tree.get(&parent).ok_or(AccountError::NotFound(parent))?;
        if !link.is_active {
            return Err(AccountError::ParentInactive(parent).into());
        }
        AccountDirectory::validate_parent(id, parent, |a| tree.get(&a).copied())?;
    }

    let mut active: accounts::ActiveModel = model.into();
    active.parent_id = Set(new_parent.map(AccountId::into_inner));
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(conn).await?)
}

/// Loads the parent link of every account.
async fn parent_links<C: ConnectionTrait>(
    conn: &C,
) -> RepositoryResult<HashMap<AccountId, ParentLink>> {
    let models = accounts::Entity::find().all(conn).await?;
    Ok(models
        .iter()
        .map(|m| (AccountId::from_uuid(m.id), parent_link(m)))
        .collect())
}

fn parent_link(model: &accounts::Model) -> ParentLink {
    ParentLink {
        parent_id: model.parent_id.map(AccountId::from_uuid),
        is_active: model.is_active,
    }
}

pub(crate) fn to_account(model: accounts::Model) -> Account {
    Account {
        id: AccountId::from_uuid(model.id),
        code: model.code,
        name: model.name,
        account_type: model.account_type.into(),
        normal_side: model.normal_side.into(),
        parent_id: model.parent_id.map(AccountId::from_uuid),
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn to_analytical(model: analytical_accounts::Model) -> AnalyticalAccount {
    AnalyticalAccount {
        id: AnalyticalAccountId::from_uuid(model.id),
        code: model.code,
        name: model.name,
        parent_account_id: AccountId::from_uuid(model.parent_account_id),
        is_active: model.is_active,
    }
}

/// Returns the IDs of accounts in `ids` that do not exist.
pub(crate) async fn missing_accounts<C>(conn: &C, ids: &[Uuid]) -> RepositoryResult<Vec<Uuid>>
where
    C: ConnectionTrait,
{
    let found: Vec<Uuid> = accounts::Entity::find()
        .filter(accounts::Column::Id.is_in(ids.iter().copied()))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();
    Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
}
