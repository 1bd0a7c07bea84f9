//! Financial period repository.
//!
//! Closing takes `FOR UPDATE` on the period row; posting reads covering
//! periods `FOR SHARE`, so a close and a posting into the same range
//! serialise.

use chrono::{NaiveDate, Utc};
use kassa_core::fiscal::{CreatePeriodInput, FinancialPeriod, PeriodError, PeriodManager};
use kassa_core::ledger::{LedgerError, validate_posting_date};
use kassa_shared::types::{FinancialPeriodId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::sea_orm_active_enums::{EntryStatus, PeriodType};
use crate::entities::{financial_periods, journal_entries};
use crate::error::RepositoryResult;

/// Financial period repository.
#[derive(Debug, Clone)]
pub struct PeriodRepository {
    db: DatabaseConnection,
}

impl PeriodRepository {
    /// Creates a new period repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an open financial period.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError` for a blank name, an inverted range, or an
    /// overlap with another period of the same type.
    pub async fn create_period(&self, input: CreatePeriodInput) -> RepositoryResult<FinancialPeriod> {
        let txn = self.db.begin().await?;

        let period_type: PeriodType = input.period_type.into();
        let same_type: Vec<FinancialPeriod> = financial_periods::Entity::find()
            .filter(financial_periods::Column::PeriodType.eq(period_type))
            .filter(financial_periods::Column::StartDate.lte(input.end_date))
            .filter(financial_periods::Column::EndDate.gte(input.start_date))
            .lock_exclusive()
            .all(&txn)
            .await?
            .into_iter()
            .map(to_period)
            .collect();

        PeriodManager::validate_new(&input, &same_type)?;

        let model = financial_periods::ActiveModel {
            id: Set(FinancialPeriodId::new().into_inner()),
            name: Set(input.name.trim().to_string()),
            period_type: Set(period_type),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            is_closed: Set(false),
            closed_by: Set(None),
            closed_at: Set(None),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(
            period_id = %model.id,
            start = %model.start_date,
            end = %model.end_date,
            "Financial period created"
        );
        Ok(to_period(model))
    }

    /// Closes a period. Closing is one-way.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError::NotFound`, `AlreadyClosed`, or
    /// `DraftEntriesInPeriod` while unposted entries are dated inside it.
    pub async fn close_period(
        &self,
        id: FinancialPeriodId,
        closed_by: Option<UserId>,
    ) -> RepositoryResult<FinancialPeriod> {
        let txn = self.db.begin().await?;

        let model = financial_periods::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(PeriodError::NotFound(id))?;

        let drafts = journal_entries::Entity::find()
            .filter(journal_entries::Column::Status.eq(EntryStatus::Draft))
            .filter(journal_entries::Column::EntryDate.gte(model.start_date))
            .filter(journal_entries::Column::EntryDate.lte(model.end_date))
            .count(&txn)
            .await?;

        PeriodManager::validate_close(&to_period(model.clone()), drafts)?;

        let mut active: financial_periods::ActiveModel = model.into();
        active.is_closed = Set(true);
        active.closed_by = Set(closed_by.map(UserId::into_inner));
        active.closed_at = Set(Some(Utc::now().into()));
        let closed = active.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(period_id = %id, name = %closed.name, "Financial period closed");
        Ok(to_period(closed))
    }

    /// Gets a period by ID.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError::NotFound` if the period does not exist.
    pub async fn get_period(&self, id: FinancialPeriodId) -> RepositoryResult<FinancialPeriod> {
        let model = financial_periods::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(PeriodError::NotFound(id))?;
        Ok(to_period(model))
    }

    /// Lists all periods ordered by start date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_periods(&self) -> RepositoryResult<Vec<FinancialPeriod>> {
        let models = financial_periods::Entity::find()
            .order_by_asc(financial_periods::Column::StartDate)
            .order_by_asc(financial_periods::Column::EndDate)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(to_period).collect())
    }
}

/// Loads the periods covering `date` with a shared lock.
pub(crate) async fn covering_periods<C>(conn: &C, date: NaiveDate) -> RepositoryResult<Vec<FinancialPeriod>>
where
    C: ConnectionTrait,
{
    let models = financial_periods::Entity::find()
        .filter(financial_periods::Column::StartDate.lte(date))
        .filter(financial_periods::Column::EndDate.gte(date))
        .lock_shared()
        .all(conn)
        .await?;
    Ok(models.into_iter().map(to_period).collect())
}

/// Rejects writes dated inside a closed period.
pub(crate) async fn ensure_open<C>(conn: &C, date: NaiveDate) -> RepositoryResult<()>
where
    C: ConnectionTrait,
{
    let periods = covering_periods(conn, date).await?;
    validate_posting_date(date, &periods).map_err(|e| {
        if let LedgerError::PeriodClosed { period, .. } = &e {
            tracing::warn!(%date, %period, "Posting rejected by closed period");
        }
        e.into()
    })
}

fn to_period(model: financial_periods::Model) -> FinancialPeriod {
    FinancialPeriod {
        id: FinancialPeriodId::from_uuid(model.id),
        name: model.name,
        period_type: model.period_type.into(),
        start_date: model.start_date,
        end_date: model.end_date,
        is_closed: model.is_closed,
        closed_by: model.closed_by.map(UserId::from_uuid),
        closed_at: model.closed_at.map(|t| t.with_timezone(&Utc)),
    }
}
