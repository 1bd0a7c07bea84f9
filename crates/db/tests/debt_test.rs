//! Debts and debt payments against a live database.

mod common;

use common::{cash_lock, connect, engine, ordinary_date};
use futures::future::join_all;
use kassa_core::cash::{EventDetails, EventKind, RecordEventInput};
use kassa_core::debt::{CreateDebtInput, DebtDirection, DebtPaymentInput, DebtStatus};
use kassa_db::LedgerEngine;
use kassa_db::repositories::DebtFilter;
use kassa_shared::AppError;
use kassa_shared::types::{DebtId, UserId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn create_debt(engine: &LedgerEngine, direction: DebtDirection, amount: Decimal) -> DebtId {
    engine
        .create_debt(CreateDebtInput {
            direction,
            counterparty: "Metalworks LLC".to_string(),
            title: "Steel delivery".to_string(),
            description: None,
            original_amount: amount,
            due_date: Some(ordinary_date()),
            created_by: None,
        })
        .await
        .expect("create debt")
        .id
}

fn payment(debt_id: DebtId, amount: Decimal) -> DebtPaymentInput {
    DebtPaymentInput {
        debt_id,
        amount,
        date: ordinary_date(),
        comment: String::new(),
        paid_by: Some(UserId::new()),
    }
}

#[tokio::test]
async fn test_payable_payments_reduce_cash_and_outstanding() {
    let Some(db) = connect().await else { return };
    let _guard = cash_lock().await;
    let engine = engine(db);
    let debt_id = create_debt(&engine, DebtDirection::Payable, dec!(1000.00)).await;

    let status = engine.get_debt_status(debt_id).await.expect("status");
    assert_eq!(status.status, DebtStatus::Open);
    assert_eq!(status.outstanding, dec!(1000.00));

    let before = engine.get_cash_balance().await.expect("balance").balance;

    let recorded = engine
        .record_debt_payment(payment(debt_id, dec!(300.00)))
        .await
        .expect("first payment");
    assert_eq!(recorded.position.outstanding, dec!(700.00));
    assert_eq!(recorded.position.status, DebtStatus::Partial);
    assert_eq!(recorded.event.kind, EventKind::DebtPayment);
    assert_eq!(recorded.event.cash_delta, dec!(-300.00));
    assert_eq!(recorded.cash.balance, before - dec!(300.00));

    let recorded = engine
        .record_debt_payment(payment(debt_id, dec!(700.00)))
        .await
        .expect("second payment");
    assert_eq!(recorded.position.outstanding, Decimal::ZERO);
    assert_eq!(recorded.position.status, DebtStatus::Closed);

    let after = engine.get_cash_balance().await.expect("balance").balance;
    assert_eq!(after, before - dec!(1000.00));

    let payments = engine.debt_payments(debt_id).await.expect("payments");
    assert_eq!(payments.len(), 2);
    assert_eq!(
        payments.iter().map(|p| p.amount).sum::<Decimal>(),
        dec!(1000.00)
    );
}

#[tokio::test]
async fn test_receivable_payment_increases_cash() {
    let Some(db) = connect().await else { return };
    let _guard = cash_lock().await;
    let engine = engine(db);
    let debt_id = create_debt(&engine, DebtDirection::Receivable, dec!(500.00)).await;
    let before = engine.get_cash_balance().await.expect("balance").balance;

    let recorded = engine
        .record_debt_payment(payment(debt_id, dec!(200.00)))
        .await
        .expect("payment");
    assert_eq!(recorded.event.cash_delta, dec!(200.00));
    assert_eq!(recorded.cash.balance, before + dec!(200.00));
}

#[tokio::test]
async fn test_payment_recorded_as_business_event() {
    let Some(db) = connect().await else { return };
    let _guard = cash_lock().await;
    let engine = engine(db);
    let debt_id = create_debt(&engine, DebtDirection::Payable, dec!(80.00)).await;

    let recorded = engine
        .record_business_event(RecordEventInput {
            amount: dec!(30.00),
            date: ordinary_date(),
            recorded_by: None,
            details: EventDetails::DebtPayment {
                debt_id,
                comment: "Cash at the gate".to_string(),
            },
        })
        .await
        .expect("debt payment event");
    assert_eq!(recorded.event.cash_delta, dec!(-30.00));

    let status = engine.get_debt_status(debt_id).await.expect("status");
    assert_eq!(status.amount_paid, dec!(30.00));
    assert_eq!(status.status, DebtStatus::Partial);

    let payments = engine.debt_payments(debt_id).await.expect("payments");
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].event_id, recorded.event.id);
}

#[tokio::test]
async fn test_overpayment_is_reported_not_clamped() {
    let Some(db) = connect().await else { return };
    let _guard = cash_lock().await;
    let engine = engine(db);
    let debt_id = create_debt(&engine, DebtDirection::Payable, dec!(100.00)).await;

    let recorded = engine
        .record_debt_payment(payment(debt_id, dec!(150.00)))
        .await
        .expect("overpayment accepted");
    assert_eq!(recorded.position.amount_paid, dec!(150.00));
    assert_eq!(recorded.position.outstanding, Decimal::ZERO);
    assert_eq!(recorded.position.overpaid, dec!(50.00));
    assert_eq!(recorded.position.status, DebtStatus::Closed);
}

#[tokio::test]
async fn test_invalid_payments_rejected() {
    let Some(db) = connect().await else { return };
    let _guard = cash_lock().await;
    let engine = engine(db);
    let before = engine.get_cash_balance().await.expect("balance").balance;

    let err = engine
        .record_debt_payment(payment(DebtId::new(), dec!(10.00)))
        .await
        .expect_err("unknown debt");
    assert!(matches!(err, AppError::NotFound(_)));

    let debt_id = create_debt(&engine, DebtDirection::Payable, dec!(10.00)).await;
    let err = engine
        .record_debt_payment(payment(debt_id, Decimal::ZERO))
        .await
        .expect_err("zero payment");
    assert!(matches!(err, AppError::Validation(_)));

    let err = engine
        .record_debt_payment(payment(debt_id, dec!(100000000000000000.00)))
        .await
        .expect_err("oversized payment");
    assert!(matches!(err, AppError::Validation(_)));

    let after = engine.get_cash_balance().await.expect("balance").balance;
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_concurrent_payments_are_all_applied() {
    let Some(db) = connect().await else { return };
    let _guard = cash_lock().await;
    let engine = engine(db);

    const PAYMENTS: usize = 20;
    let debt_id = create_debt(&engine, DebtDirection::Payable, dec!(1000.00)).await;
    let before = engine.get_cash_balance().await.expect("balance").balance;

    let tasks = (0..PAYMENTS).map(|_| {
        let engine = engine.clone();
        async move { engine.record_debt_payment(payment(debt_id, dec!(10.00))).await }
    });
    let results = join_all(tasks).await;

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    for result in &results {
        if let Err(e) = result {
            assert!(e.is_retryable(), "unexpected failure: {e}");
        }
    }
    assert_eq!(succeeded, PAYMENTS);

    let debt = engine.get_debt(debt_id).await.expect("debt");
    assert_eq!(debt.amount_paid, dec!(200.00));

    let status = engine.get_debt_status(debt_id).await.expect("status");
    assert_eq!(status.outstanding, dec!(800.00));
    assert_eq!(status.status, DebtStatus::Partial);

    let after = engine.get_cash_balance().await.expect("balance").balance;
    assert_eq!(after, before - dec!(200.00));

    let payments = engine.debt_payments(debt_id).await.expect("payments");
    assert_eq!(payments.len(), PAYMENTS);
}

#[tokio::test]
async fn test_list_by_status() {
    let Some(db) = connect().await else { return };
    let _guard = cash_lock().await;
    let engine = engine(db);
    let open = create_debt(&engine, DebtDirection::Receivable, dec!(40.00)).await;
    let partial = create_debt(&engine, DebtDirection::Receivable, dec!(40.00)).await;
    let closed = create_debt(&engine, DebtDirection::Receivable, dec!(40.00)).await;
    engine
        .record_debt_payment(payment(partial, dec!(10.00)))
        .await
        .expect("partial payment");
    engine
        .record_debt_payment(payment(closed, dec!(40.00)))
        .await
        .expect("full payment");

    let listed = |status: DebtStatus| {
        let engine = engine.clone();
        async move {
            engine
                .list_debts(DebtFilter {
                    status: Some(status),
                    direction: Some(DebtDirection::Receivable),
                    ..DebtFilter::default()
                })
                .await
                .expect("list debts")
                .into_iter()
                .map(|d| d.id)
                .collect::<Vec<_>>()
        }
    };

    let open_ids = listed(DebtStatus::Open).await;
    assert!(open_ids.contains(&open));
    assert!(!open_ids.contains(&partial));

    let partial_ids = listed(DebtStatus::Partial).await;
    assert!(partial_ids.contains(&partial));
    assert!(!partial_ids.contains(&closed));

    let closed_ids = listed(DebtStatus::Closed).await;
    assert!(closed_ids.contains(&closed));
    assert!(!closed_ids.contains(&open));
}
