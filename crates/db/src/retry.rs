//! Transparent retry of transactions aborted by Postgres.
//!
//! Only serialization failures (`40001`) and deadlocks (`40P01`) are retried.
//! Each retry runs the whole transaction again from the start.

use std::future::Future;
use std::time::Duration;

use kassa_shared::RetryConfig;
use sea_orm::{DbErr, RuntimeErr};

use crate::error::RepositoryError;

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const UNIQUE_VIOLATION: &str = "23505";

/// Returns the SQLSTATE carried by a database error, if any.
fn sqlstate(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(e)))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(e))) => {
            e.code().map(|c| c.into_owned())
        }
        _ => None,
    }
}

/// Returns true if `err` aborted the transaction because of a concurrent writer.
#[must_use]
pub fn is_transient(err: &RepositoryError) -> bool {
    match err {
        RepositoryError::Database(db) => sqlstate(db)
            .is_some_and(|code| code == SERIALIZATION_FAILURE || code == DEADLOCK_DETECTED),
        _ => false,
    }
}

/// Returns true if `err` is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    sqlstate(err).is_some_and(|code| code == UNIQUE_VIOLATION)
}

/// Delay before attempt `attempt + 1` (zero-based `attempt`).
fn backoff(config: &RetryConfig, attempt: u32) -> Duration {
    let factor = 1u64 << attempt.min(10);
    Duration::from_millis(config.base_delay_ms.saturating_mul(factor))
}

/// Runs `op` until it succeeds, fails with a non-transient error, or the
/// attempt budget is spent.
///
/// `op` must open and commit its own transaction.
///
/// # Errors
///
/// Returns the first non-transient error, or `RepositoryError::Conflict`
/// once every attempt hit a transient failure.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T, RepositoryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RepositoryError>>,
{
    let attempts = config.max_attempts.max(1);
    for attempt in 0..attempts {
        match op().await {
            Err(err) if is_transient(&err) => {
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = attempts,
                    error = %err,
                    "Transaction aborted by concurrent writer, retrying"
                );
                if attempt + 1 < attempts {
                    tokio::time::sleep(backoff(config, attempt)).await;
                }
            }
            other => return other,
        }
    }
    Err(RepositoryError::Conflict { attempts })
}
