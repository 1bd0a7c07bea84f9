//! The operating cash account.
//!
//! One row, id 1, created on first access. The balance only ever changes
//! through an atomic `balance = balance + delta` update issued in the same
//! transaction as the event that caused it.

use chrono::Utc;
use kassa_core::cash::{CASH_ACCOUNT_ID, CashAccount};
use kassa_shared::RetryConfig;
use kassa_shared::types::Currency;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::entities::cash_accounts;
use crate::error::{RepositoryError, RepositoryResult};
use crate::retry::with_retry;

const DEFAULT_DESCRIPTION: &str = "Operating cash";

/// Repository for the singleton cash account.
#[derive(Debug, Clone)]
pub struct CashLedger {
    db: DatabaseConnection,
    currency: Currency,
    retry: RetryConfig,
}

impl CashLedger {
    /// Creates a cash ledger; the row is created in `currency` if missing.
    #[must_use]
    pub fn new(db: DatabaseConnection, currency: Currency) -> Self {
        Self {
            db,
            currency,
            retry: RetryConfig::default(),
        }
    }

    /// Sets the retry budget for serialization conflicts.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the current balance, creating the account with a zero balance
    /// on first access.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the stored currency
    /// is unknown.
    pub async fn get_balance(&self) -> RepositoryResult<CashAccount> {
        ensure_account(&self.db, self.currency).await?;
        let model = cash_accounts::Entity::find_by_id(CASH_ACCOUNT_ID)
            .one(&self.db)
            .await?
            .ok_or_else(|| RepositoryError::Corrupt("cash account row missing".to_string()))?;
        to_cash_account(model)
    }

    /// Adds a signed amount to the balance in its own transaction.
    ///
    /// Business events apply their delta inside their own transaction
    /// instead, so the event and its cash effect commit together.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails after retries.
    pub async fn apply_delta(&self, delta: Decimal) -> RepositoryResult<CashAccount> {
        let account = with_retry(&self.retry, move || async move {
            let txn = self.db.begin().await?;
            let account = apply_delta_in(&txn, delta, self.currency).await?;
            txn.commit().await?;
            Ok(account)
        })
        .await?;

        tracing::info!(%delta, balance = %account.balance, "Cash balance adjusted");
        Ok(account)
    }
}

/// Creates the cash row if it does not exist yet.
async fn ensure_account<C>(conn: &C, currency: Currency) -> RepositoryResult<()>
where
    C: ConnectionTrait,
{
    let row = cash_accounts::ActiveModel {
        id: Set(CASH_ACCOUNT_ID),
        balance: Set(Decimal::ZERO),
        currency: Set(currency.code().to_string()),
        description: Set(DEFAULT_DESCRIPTION.to_string()),
        updated_at: Set(Utc::now().into()),
    };
    cash_accounts::Entity::insert(row)
        .on_conflict(
            OnConflict::column(cash_accounts::Column::Id)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

/// Atomically adds `delta` to the balance inside the caller's transaction.
pub(crate) async fn apply_delta_in<C>(
    conn: &C,
    delta: Decimal,
    currency: Currency,
) -> RepositoryResult<CashAccount>
where
    C: ConnectionTrait,
{
    ensure_account(conn, currency).await?;

    let updated = cash_accounts::Entity::update_many()
        .col_expr(
            cash_accounts::Column::Balance,
            Expr::col(cash_accounts::Column::Balance).add(delta),
        )
        .col_expr(cash_accounts::Column::UpdatedAt, Expr::current_timestamp().into())
        .filter(cash_accounts::Column::Id.eq(CASH_ACCOUNT_ID))
        .exec_with_returning(conn)
        .await?;

    let model = updated
        .into_iter()
        .next()
        .ok_or_else(|| RepositoryError::Corrupt("cash account row missing".to_string()))?;

    tracing::debug!(%delta, balance = %model.balance, "Cash delta applied");
    to_cash_account(model)
}

fn to_cash_account(model: cash_accounts::Model) -> RepositoryResult<CashAccount> {
    let currency = Currency::from_code(&model.currency)
        .ok_or_else(|| RepositoryError::Corrupt(format!("unknown currency {}", model.currency)))?;
    Ok(CashAccount {
        balance: model.balance,
        currency,
        description: model.description,
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}
