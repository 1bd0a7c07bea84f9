//! Debt repository: payables, receivables and their payments.
//!
//! A payment locks the debt row first and the cash row second. Every writer
//! that touches both takes them in that order.

use chrono::{NaiveDate, Utc};
use kassa_core::cash::{BusinessEvent, CashAccount, EventDetails};
use kassa_core::debt::{
    CreateDebtInput, Debt, DebtDirection, DebtError, DebtPayment, DebtPaymentInput, DebtPosition,
    DebtStatus,
};
use kassa_shared::RetryConfig;
use kassa_shared::types::{BusinessEventId, Currency, DebtId, DebtPaymentId, UserId};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::cash::apply_delta_in;
use super::event::{NewEvent, insert_event};
use crate::entities::sea_orm_active_enums::DebtDirection as DbDebtDirection;
use crate::entities::{debt_payments, debts};
use crate::error::RepositoryResult;
use crate::retry::with_retry;

/// Filter options for listing debts.
#[derive(Debug, Clone, Default)]
pub struct DebtFilter {
    /// Only debts in this derived status.
    pub status: Option<DebtStatus>,
    /// Only payables or only receivables.
    pub direction: Option<DebtDirection>,
    /// Only open debts whose due date is before this day.
    pub overdue_on: Option<NaiveDate>,
}

/// Everything a debt payment produced.
#[derive(Debug, Clone)]
pub struct RecordedPayment {
    /// The payment row.
    pub payment: DebtPayment,
    /// The business event carrying the cash effect.
    pub event: BusinessEvent,
    /// Debt position after the payment.
    pub position: DebtPosition,
    /// Cash account after the payment.
    pub cash: CashAccount,
}

/// Debt repository.
#[derive(Debug, Clone)]
pub struct DebtRepository {
    db: DatabaseConnection,
    currency: Currency,
    retry: RetryConfig,
}

impl DebtRepository {
    /// Creates a new debt repository.
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

    /// Creates a debt with nothing paid.
    ///
    /// # Errors
    ///
    /// Returns `DebtError` for a blank counterparty or title, or a bad amount.
    pub async fn create_debt(&self, input: CreateDebtInput) -> RepositoryResult<Debt> {
        input.validate()?;

        let now = Utc::now();
        let model = debts::ActiveModel {
            id: Set(DebtId::new().into_inner()),
            direction: Set(input.direction.into()),
            counterparty: Set(input.counterparty.trim().to_string()),
            title: Set(input.title.trim().to_string()),
            description: Set(input.description),
            original_amount: Set(input.original_amount),
            amount_paid: Set(Decimal::ZERO),
            due_date: Set(input.due_date),
            created_by: Set(input.created_by.map(UserId::into_inner)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(
            debt_id = %model.id,
            direction = ?model.direction,
            amount = %model.original_amount,
            "Debt created"
        );
        Ok(to_debt(model))
    }

    /// Records a payment: increments the paid amount, moves cash in the
    /// debt's direction, and stores the payment event, atomically.
    ///
    /// # Errors
    ///
    /// Returns `DebtError::NotFound` or an amount validation error.
    pub async fn record_payment(&self, input: DebtPaymentInput) -> RepositoryResult<RecordedPayment> {
        input.validate()?;

        let input = &input;
        let recorded = with_retry(&self.retry, move || async move {
            let txn = self.db.begin().await?;
            let recorded = pay_in(&txn, input, self.currency).await?;
            txn.commit().await?;
            Ok(recorded)
        })
        .await?;

        tracing::info!(
            debt_id = %input.debt_id,
            amount = %input.amount,
            outstanding = %recorded.position.outstanding,
            status = recorded.position.status.as_str(),
            "Debt payment recorded"
        );
        Ok(recorded)
    }

    /// Gets a debt by ID.
    ///
    /// # Errors
    ///
    /// Returns `DebtError::NotFound` if the debt does not exist.
    pub async fn get_debt(&self, id: DebtId) -> RepositoryResult<Debt> {
        let model = debts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(DebtError::NotFound(id))?;
        Ok(to_debt(model))
    }

    /// Returns the outstanding amount and derived status of a debt.
    ///
    /// # Errors
    ///
    /// Returns `DebtError::NotFound` if the debt does not exist.
    pub async fn get_debt_status(&self, id: DebtId) -> RepositoryResult<DebtPosition> {
        Ok(self.get_debt(id).await?.position())
    }

    /// Lists debts, soonest due first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_debts(&self, filter: DebtFilter) -> RepositoryResult<Vec<Debt>> {
        let mut query = debts::Entity::find();
        if let Some(direction) = filter.direction {
            query = query.filter(debts::Column::Direction.eq(DbDebtDirection::from(direction)));
        }
        match filter.status {
            Some(DebtStatus::Closed) => {
                query = query.filter(
                    Expr::col(debts::Column::AmountPaid).gte(Expr::col(debts::Column::OriginalAmount)),
                );
            }
            Some(DebtStatus::Partial) => {
                query = query
                    .filter(debts::Column::AmountPaid.gt(Decimal::ZERO))
                    .filter(
                        Expr::col(debts::Column::AmountPaid)
                            .lt(Expr::col(debts::Column::OriginalAmount)),
                    );
            }
            Some(DebtStatus::Open) => {
                query = query.filter(debts::Column::AmountPaid.lte(Decimal::ZERO));
            }
            None => {}
        }

        let debts = query
            .order_by_asc(debts::Column::DueDate)
            .order_by_asc(debts::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_debt);

        Ok(match filter.overdue_on {
            Some(today) => debts.filter(|d| d.is_overdue(today)).collect(),
            None => debts.collect(),
        })
    }

    /// Lists payments of a debt in date order.
    ///
    /// # Errors
    ///
    /// Returns `DebtError::NotFound` if the debt does not exist.
    pub async fn payments(&self, id: DebtId) -> RepositoryResult<Vec<DebtPayment>> {
        self.get_debt(id).await?;
        let models = debt_payments::Entity::find()
            .filter(debt_payments::Column::DebtId.eq(id.into_inner()))
            .order_by_asc(debt_payments::Column::PaymentDate)
            .order_by_asc(debt_payments::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(to_payment).collect())
    }
}

/// Applies a payment inside the caller's transaction.
pub(crate) async fn pay_in<C>(
    conn: &C,
    input: &DebtPaymentInput,
    currency: Currency,
) -> RepositoryResult<RecordedPayment>
where
    C: ConnectionTrait,
{
    let debt = debts::Entity::find_by_id(input.debt_id.into_inner())
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or(DebtError::NotFound(input.debt_id))?;

    let updated = debts::Entity::update_many()
        .col_expr(
            debts::Column::AmountPaid,
            Expr::col(debts::Column::AmountPaid).add(input.amount),
        )
        .col_expr(debts::Column::UpdatedAt, Expr::current_timestamp().into())
        .filter(debts::Column::Id.eq(debt.id))
        .exec_with_returning(conn)
        .await?
        .into_iter()
        .next()
        .ok_or(DebtError::NotFound(input.debt_id))?;

    let debt = to_debt(updated);
    let position = debt.position();
    if position.overpaid > Decimal::ZERO {
        tracing::warn!(
            debt_id = %debt.id,
            original = %debt.original_amount,
            paid = %debt.amount_paid,
            overpaid = %position.overpaid,
            "Debt overpaid"
        );
    }

    let delta = debt.direction.cash_flow().signed(input.amount);
    let cash = apply_delta_in(conn, delta, currency).await?;

    let details = EventDetails::DebtPayment {
        debt_id: input.debt_id,
        comment: input.comment.clone(),
    };
    let event = insert_event(
        conn,
        NewEvent {
            details: &details,
            amount: input.amount,
            cash_delta: delta,
            date: input.date,
            recorded_by: input.paid_by,
        },
    )
    .await?;

    let payment = debt_payments::ActiveModel {
        id: Set(DebtPaymentId::new().into_inner()),
        debt_id: Set(debt.id.into_inner()),
        event_id: Set(event.id.into_inner()),
        amount: Set(input.amount),
        payment_date: Set(input.date),
        comment: Set(input.comment.clone()),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await?;

    Ok(RecordedPayment {
        payment: to_payment(payment),
        event,
        position,
        cash,
    })
}

fn to_debt(model: debts::Model) -> Debt {
    Debt {
        id: DebtId::from_uuid(model.id),
        direction: model.direction.into(),
        counterparty: model.counterparty,
        title: model.title,
        description: model.description,
        original_amount: model.original_amount,
        amount_paid: model.amount_paid,
        due_date: model.due_date,
        created_by: model.created_by.map(UserId::from_uuid),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn to_payment(model: debt_payments::Model) -> DebtPayment {
    DebtPayment {
        id: DebtPaymentId::from_uuid(model.id),
        debt_id: DebtId::from_uuid(model.debt_id),
        event_id: BusinessEventId::from_uuid(model.event_id),
        amount: model.amount,
        date: model.payment_date,
        comment: model.comment,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
