//! Financial periods and the posting gate against a live database.

mod common;

use common::{connect, create_account, date, engine, unique_year};
use kassa_core::accounts::AccountType;
use kassa_core::fiscal::{CreatePeriodInput, PeriodError, PeriodType};
use kassa_core::ledger::{CreateDraftInput, JournalLineInput, PostEntryInput};
use kassa_db::{LedgerEngine, PeriodRepository, RepositoryError};
use kassa_shared::AppError;
use kassa_shared::types::UserId;
use rust_decimal_macros::dec;

fn month(year: i32, month: u32) -> CreatePeriodInput {
    let start = date(year, month, 1);
    let end = if month == 12 {
        date(year, 12, 31)
    } else {
        date(year, month + 1, 1).pred_opt().expect("valid date")
    };
    CreatePeriodInput {
        name: format!("{year}-{month:02}"),
        period_type: PeriodType::Month,
        start_date: start,
        end_date: end,
    }
}

async fn post_sample(engine: &LedgerEngine, year: i32) -> Result<(), AppError> {
    let cash = create_account(engine, AccountType::Asset).await;
    let equity = create_account(engine, AccountType::Equity).await;
    engine
        .post_journal_entry(PostEntryInput {
            date: date(year, 3, 15),
            memo: "Capital".to_string(),
            created_by: None,
            lines: vec![
                JournalLineInput::debit(cash.id, dec!(500.00)),
                JournalLineInput::credit(equity.id, dec!(500.00)),
            ],
        })
        .await
        .map(|_| ())
}

#[tokio::test]
async fn test_closed_period_blocks_posting() {
    let Some(db) = connect().await else { return };
    let engine = engine(db);
    let year = unique_year();

    let period = engine.create_period(month(year, 3)).await.expect("create period");
    assert!(!period.is_closed);

    post_sample(&engine, year).await.expect("open period accepts postings");

    let closer = UserId::new();
    let closed = engine
        .close_period(period.id, Some(closer))
        .await
        .expect("close period");
    assert!(closed.is_closed);
    assert_eq!(closed.closed_by, Some(closer));
    assert!(closed.closed_at.is_some());

    let err = post_sample(&engine, year)
        .await
        .expect_err("closed period rejects postings");
    assert!(matches!(err, AppError::PeriodClosed(_)));

    let err = engine
        .create_draft(CreateDraftInput {
            date: date(year, 3, 20),
            memo: "Late".to_string(),
            created_by: None,
        })
        .await
        .expect_err("closed period rejects drafts");
    assert!(matches!(err, AppError::PeriodClosed(_)));

    // Dates outside any period stay open.
    post_sample(&engine, year + 1)
        .await
        .expect("uncovered date accepts postings");
}

#[tokio::test]
async fn test_close_is_one_way() {
    let Some(db) = connect().await else { return };
    let repo = PeriodRepository::new(db);
    let year = unique_year();

    let period = repo.create_period(month(year, 6)).await.expect("create period");
    repo.close_period(period.id, None).await.expect("close period");

    let err = repo
        .close_period(period.id, None)
        .await
        .expect_err("second close fails");
    assert!(matches!(
        err,
        RepositoryError::Period(PeriodError::AlreadyClosed(_))
    ));
}

#[tokio::test]
async fn test_drafts_block_close() {
    let Some(db) = connect().await else { return };
    let engine = engine(db);
    let year = unique_year();

    let period = engine.create_period(month(year, 9)).await.expect("create period");
    let draft = engine
        .create_draft(CreateDraftInput {
            date: date(year, 9, 10),
            memo: "Pending".to_string(),
            created_by: None,
        })
        .await
        .expect("create draft");

    let err = engine
        .close_period(period.id, None)
        .await
        .expect_err("drafts block the close");
    assert!(matches!(err, AppError::BusinessRule(_)));

    engine.delete_draft(draft.id).await.expect("delete draft");
    engine
        .close_period(period.id, None)
        .await
        .expect("close after the draft is gone");
}

#[tokio::test]
async fn test_overlap_only_within_type() {
    let Some(db) = connect().await else { return };
    let repo = PeriodRepository::new(db);
    let year = unique_year();

    repo.create_period(month(year, 1)).await.expect("january");
    repo.create_period(CreatePeriodInput {
        name: format!("{year} Q1"),
        period_type: PeriodType::Quarter,
        start_date: date(year, 1, 1),
        end_date: date(year, 3, 31),
    })
    .await
    .expect("a quarter may contain a month");

    let err = repo
        .create_period(CreatePeriodInput {
            name: format!("{year} mid-January"),
            period_type: PeriodType::Month,
            start_date: date(year, 1, 15),
            end_date: date(year, 2, 14),
        })
        .await
        .expect_err("months may not overlap");
    assert!(matches!(
        err,
        RepositoryError::Period(PeriodError::Overlap { .. })
    ));

    let err = repo
        .create_period(CreatePeriodInput {
            name: "Backwards".to_string(),
            period_type: PeriodType::Custom,
            start_date: date(year, 5, 10),
            end_date: date(year, 5, 1),
        })
        .await
        .expect_err("inverted range");
    assert!(matches!(
        err,
        RepositoryError::Period(PeriodError::InvalidRange { .. })
    ));
}
