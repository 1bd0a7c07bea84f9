//! Business event repository.
//!
//! Recording an event and applying its cash effect is one transaction. An
//! event is only ever inserted once; later metadata edits never touch the
//! balance.

use chrono::{NaiveDate, Utc};
use kassa_core::cash::{
    BusinessEvent, CashAccount, CashError, EventDetails, EventKind, RecordEventInput,
};
use kassa_core::debt::DebtPaymentInput;
use kassa_shared::RetryConfig;
use kassa_shared::types::{BusinessEventId, Currency, ExpenseCategoryId, UserId};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::cash::apply_delta_in;
use super::debt::pay_in;
use crate::entities::sea_orm_active_enums::EventKind as DbEventKind;
use crate::entities::{business_events, debt_payments, expense_categories};
use crate::error::{RepositoryError, RepositoryResult};
use crate::retry::with_retry;

/// Filter options for listing business events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Only events of this kind.
    pub kind: Option<EventKind>,
    /// Events dated on or after this day.
    pub date_from: Option<NaiveDate>,
    /// Events dated on or before this day.
    pub date_to: Option<NaiveDate>,
    /// Maximum number of events returned.
    pub limit: Option<u64>,
}

/// A recorded event and the cash balance right after it.
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    /// The stored event.
    pub event: BusinessEvent,
    /// Cash account after the event's delta.
    pub cash: CashAccount,
}

/// Business event repository.
#[derive(Debug, Clone)]
pub struct EventRepository {
    db: DatabaseConnection,
    currency: Currency,
    retry: RetryConfig,
}

impl EventRepository {
    /// Creates a new event repository.
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

    /// Records a business event and applies its cash delta exactly once.
    ///
    /// Debt payments also increment the debt's paid amount in the same
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `CashError` for a bad amount or metadata, `CategoryNotFound`
    /// for an unknown expense category, or `DebtError::NotFound`.
    pub async fn record_business_event(
        &self,
        input: RecordEventInput,
    ) -> RepositoryResult<RecordedEvent> {
        input.validate()?;

        let input = &input;
        let recorded = with_retry(&self.retry, move || async move {
            let txn = self.db.begin().await?;
            let recorded = record_in(&txn, input, self.currency).await?;
            txn.commit().await?;
            Ok(recorded)
        })
        .await?;

        tracing::info!(
            event_id = %recorded.event.id,
            kind = %recorded.event.kind,
            amount = %recorded.event.amount,
            cash_delta = %recorded.event.cash_delta,
            balance = %recorded.cash.balance,
            "Business event recorded"
        );
        Ok(recorded)
    }

    /// Replaces an event's metadata. The amount and the cash balance are
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns `EventNotFound`, `KindMismatch`, `DebtReassignment`, or a
    /// metadata validation error.
    pub async fn update_event_metadata(
        &self,
        event_id: BusinessEventId,
        details: EventDetails,
    ) -> RepositoryResult<BusinessEvent> {
        let txn = self.db.begin().await?;

        let model = business_events::Entity::find_by_id(event_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(CashError::EventNotFound(event_id))?;

        let existing: EventDetails = serde_json::from_value(model.metadata.clone())?;
        details.validate_replacement(&existing)?;
        if let Some(category_id) = details.category_id() {
            ensure_category(&txn, category_id).await?;
        }

        if let EventDetails::DebtPayment { comment, .. } = &details {
            debt_payments::Entity::update_many()
                .col_expr(
                    debt_payments::Column::Comment,
                    Expr::value(comment.clone()),
                )
                .filter(debt_payments::Column::EventId.eq(model.id))
                .exec(&txn)
                .await?;
        }

        let mut active: business_events::ActiveModel = model.into();
        active.metadata = Set(serde_json::to_value(&details)?);
        active.category_id = Set(details.category_id().map(ExpenseCategoryId::into_inner));
        active.income_type = Set(details.income_type().map(|t| t.as_str().to_string()));
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(event_id = %event_id, "Business event metadata updated, cash unchanged");
        to_event(updated)
    }

    /// Gets an event by ID.
    ///
    /// # Errors
    ///
    /// Returns `CashError::EventNotFound` if the event does not exist.
    pub async fn get_event(&self, event_id: BusinessEventId) -> RepositoryResult<BusinessEvent> {
        let model = business_events::Entity::find_by_id(event_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(CashError::EventNotFound(event_id))?;
        to_event(model)
    }

    /// Lists events, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or stored metadata is corrupt.
    pub async fn list_events(&self, filter: EventFilter) -> RepositoryResult<Vec<BusinessEvent>> {
        let mut query = business_events::Entity::find();
        if let Some(kind) = filter.kind {
            query = query.filter(business_events::Column::Kind.eq(DbEventKind::from(kind)));
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(business_events::Column::EventDate.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(business_events::Column::EventDate.lte(date_to));
        }
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        query
            .order_by_desc(business_events::Column::EventDate)
            .order_by_desc(business_events::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_event)
            .collect()
    }
}

/// Records an event inside the caller's transaction.
async fn record_in<C>(
    conn: &C,
    input: &RecordEventInput,
    currency: Currency,
) -> RepositoryResult<RecordedEvent>
where
    C: ConnectionTrait,
{
    match (&input.details, input.kind().fixed_flow()) {
        (EventDetails::DebtPayment { debt_id, comment }, _) => {
            let payment = DebtPaymentInput {
                debt_id: *debt_id,
                amount: input.amount,
                date: input.date,
                comment: comment.clone(),
                paid_by: input.recorded_by,
            };
            let recorded = pay_in(conn, &payment, currency).await?;
            Ok(RecordedEvent {
                event: recorded.event,
                cash: recorded.cash,
            })
        }
        (details, Some(flow)) => {
            if let Some(category_id) = details.category_id() {
                ensure_category(conn, category_id).await?;
            }
            let delta = flow.signed(input.amount);
            let cash = apply_delta_in(conn, delta, currency).await?;
            let event = insert_event(
                conn,
                NewEvent {
                    details,
                    amount: input.amount,
                    cash_delta: delta,
                    date: input.date,
                    recorded_by: input.recorded_by,
                },
            )
            .await?;
            Ok(RecordedEvent { event, cash })
        }
        (details, None) => Err(RepositoryError::Corrupt(format!(
            "event kind {} has no cash direction",
            details.kind()
        ))),
    }
}

async fn ensure_category<C>(conn: &C, category_id: ExpenseCategoryId) -> RepositoryResult<()>
where
    C: ConnectionTrait,
{
    expense_categories::Entity::find_by_id(category_id.into_inner())
        .one(conn)
        .await?
        .ok_or(CashError::CategoryNotFound(category_id))?;
    Ok(())
}

/// Fields of an event about to be inserted.
pub(crate) struct NewEvent<'a> {
    pub details: &'a EventDetails,
    pub amount: Decimal,
    pub cash_delta: Decimal,
    pub date: NaiveDate,
    pub recorded_by: Option<UserId>,
}

/// Inserts an event row. The caller has already applied `cash_delta`.
pub(crate) async fn insert_event<C>(conn: &C, new: NewEvent<'_>) -> RepositoryResult<BusinessEvent>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let model = business_events::ActiveModel {
        id: Set(BusinessEventId::new().into_inner()),
        kind: Set(new.details.kind().into()),
        amount: Set(new.amount),
        cash_delta: Set(new.cash_delta),
        event_date: Set(new.date),
        recorded_by: Set(new.recorded_by.map(UserId::into_inner)),
        category_id: Set(new.details.category_id().map(ExpenseCategoryId::into_inner)),
        income_type: Set(new.details.income_type().map(|t| t.as_str().to_string())),
        debt_id: Set(new.details.debt_id().map(Into::into)),
        metadata: Set(serde_json::to_value(new.details)?),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(conn)
    .await?;
    to_event(model)
}

pub(crate) fn to_event(model: business_events::Model) -> RepositoryResult<BusinessEvent> {
    let details: EventDetails = serde_json::from_value(model.metadata)?;
    let kind: EventKind = model.kind.into();
    if details.kind() != kind {
        return Err(RepositoryError::Corrupt(format!(
            "event {} is stored as {kind} but its metadata describes {}",
            model.id,
            details.kind()
        )));
    }
    Ok(BusinessEvent {
        id: BusinessEventId::from_uuid(model.id),
        kind,
        amount: model.amount,
        cash_delta: model.cash_delta,
        date: model.event_date,
        recorded_by: model.recorded_by.map(UserId::from_uuid),
        details,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}
