//! Database layer with `SeaORM` entities, repositories and the ledger engine.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repositories that run every ledger operation in one transaction
//! - The [`LedgerEngine`] facade
//! - Database migrations

pub mod engine;
pub mod entities;
pub mod error;
pub mod migration;
pub mod repositories;
pub mod retry;

pub use engine::LedgerEngine;
pub use error::{RepositoryError, RepositoryResult};
pub use repositories::{
    AccountRepository, CashLedger, CategoryRepository, CorrespondenceRepository, DebtRepository,
    EventRepository, JournalRepository, PeriodRepository, ReportRepository, TemplateRepository,
};

use kassa_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    tracing::debug!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Connecting to database"
    );
    Database::connect(options).await
}
