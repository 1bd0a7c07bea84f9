//! Schema migration runner for the Kassa ledger.
//!
//! Reads `DATABASE_URL` (or `.env`) and applies the ledger schema:
//!   kassa-migrator up      - Apply pending migrations
//!   kassa-migrator down    - Roll back the last migration
//!   kassa-migrator status  - List applied and pending migrations
//!   kassa-migrator fresh   - Drop everything and migrate from scratch

use kassa_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // run_cli installs its own tracing subscriber
    cli::run_cli(Migrator).await;
}
