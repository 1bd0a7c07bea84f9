//! Kassa operator CLI.
//!
//! Thin wrapper over [`LedgerEngine`]: every command loads [`AppConfig`],
//! connects, runs one engine operation and prints the result.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use kassa_core::assets::{AssetType, CreateAssetInput};
use kassa_core::cash::{EventDetails, IncomeType, RecordEventInput};
use kassa_db::migration::Migrator;
use kassa_db::repositories::DebtFilter;
use kassa_db::{LedgerEngine, connect};
use kassa_shared::AppConfig;
use kassa_shared::types::{AssetId, DebtId, ExpenseCategoryId};
use rust_decimal::Decimal;
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "kassa",
    version,
    about = "Factory cash book and double-entry ledger",
    long_about = "Kassa keeps the operating cash balance, the double-entry journal, \
                  debts and the reports built on them."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,

    /// Show the operating cash balance
    Balance,

    /// Show the cash balance with this month's income and expenses
    Dashboard {
        /// Day inside the month to report (YYYY-MM-DD), defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Print the trial balance
    TrialBalance {
        /// Only entries dated on or before this day (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Print the turnover statement of one account
    Statement {
        /// Account code
        code: String,
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },

    /// Print income and expenses over a date range
    Summary {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },

    /// Show the outstanding amount and status of a debt
    DebtStatus {
        /// Debt ID
        id: Uuid,
    },

    /// List debts, soonest due first
    Debts {
        /// Only open debts already past due
        #[arg(long)]
        overdue: bool,
    },

    /// Record a business event
    #[command(subcommand)]
    Record(RecordCommands),

    /// List factory assets, most valuable first
    Assets {
        /// Include retired assets
        #[arg(long)]
        all: bool,
    },

    /// Register, revalue or retire a factory asset
    #[command(subcommand)]
    Asset(AssetCommands),
}

#[derive(Subcommand)]
enum AssetCommands {
    /// Register a new asset
    Add {
        name: String,
        /// building, equipment, vehicle, furniture, electronics or other
        #[arg(long, default_value = "equipment")]
        asset_type: AssetType,
        /// Price paid
        #[arg(long)]
        price: Decimal,
        /// Current value, defaults to the price
        #[arg(long)]
        value: Option<Decimal>,
        /// Purchase date, defaults to today
        #[arg(long)]
        purchased: Option<NaiveDate>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        supplier: Option<String>,
        /// Last day of warranty
        #[arg(long)]
        warranty: Option<NaiveDate>,
    },
    /// Set the current value of an asset
    Revalue { id: Uuid, value: Decimal },
    /// Write an asset off
    Retire { id: Uuid },
}

#[derive(Subcommand)]
enum RecordCommands {
    /// Money put into the business
    Deposit {
        amount: Decimal,
        #[arg(short, long, default_value = "")]
        comment: String,
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Money taken out of the business
    Withdrawal {
        amount: Decimal,
        #[arg(short, long, default_value = "")]
        comment: String,
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Operating expense
    Expense {
        amount: Decimal,
        /// Expense category ID
        #[arg(long)]
        category: Uuid,
        #[arg(long)]
        description: String,
        #[arg(long)]
        supplier: Option<String>,
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Income (sales or other)
    Income {
        amount: Decimal,
        /// `sales` or `other`
        #[arg(long, default_value = "sales")]
        income_type: IncomeType,
        #[arg(long)]
        description: String,
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Payment against a debt
    DebtPayment {
        amount: Decimal,
        /// Debt ID
        #[arg(long)]
        debt: Uuid,
        #[arg(short, long, default_value = "")]
        comment: String,
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kassa=info,kassa_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("failed to load configuration")?;
    let db = connect(&config.database)
        .await
        .context("failed to connect to database")?;

    if matches!(cli.command, Commands::Migrate) {
        Migrator::up(&db, None).await?;
        tracing::info!("Migrations applied");
        return Ok(());
    }

    let engine = LedgerEngine::new(db, &config.ledger);
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Migrate => {}
        Commands::Balance => {
            let cash = engine.get_cash_balance().await?;
            println!("{}", cash.money());
        }
        Commands::Dashboard { today: day } => {
            let dashboard = engine.cash_dashboard(day.unwrap_or(today)).await?;
            println!("Balance:  {} {}", dashboard.balance, dashboard.currency);
            println!(
                "Month:    {} .. {}",
                dashboard.month_start, dashboard.month_end
            );
            println!("Income:   {}", dashboard.month_income);
            println!("Expenses: {}", dashboard.month_expenses);
            println!("Net:      {}", dashboard.month_net());
            println!("Assets:   {}", dashboard.total_assets);
        }
        Commands::TrialBalance { as_of } => {
            let report = engine.get_trial_balance(as_of).await?;
            println!("{:<20} {:<32} {:>16} {:>16}", "Code", "Name", "Debit", "Credit");
            for row in &report.rows {
                println!(
                    "{:<20} {:<32} {:>16} {:>16}",
                    row.code, row.name, row.debit_total, row.credit_total
                );
            }
            println!(
                "{:<53} {:>16} {:>16}",
                "Total", report.totals.total_debit, report.totals.total_credit
            );
            if !report.totals.is_balanced {
                anyhow::bail!("trial balance does not balance");
            }
        }
        Commands::Statement { code, from, to } => {
            let account = engine
                .find_account_by_code(&code)
                .await?
                .with_context(|| format!("no account with code {code}"))?;
            let statement = engine.account_statement(account.id, from, to).await?;
            let t = statement.turnover;
            println!("{} {} ({} .. {})", statement.code, statement.name, from, to);
            println!("Opening: {}", t.opening_balance);
            println!("Debit:   {}", t.debit_turnover);
            println!("Credit:  {}", t.credit_turnover);
            println!("Closing: {}", t.closing_balance);
        }
        Commands::Summary { from, to } => {
            let summary = engine.financial_summary(from, to).await?;
            println!("Income:           {}", summary.total_income);
            for (income_type, amount) in &summary.income_by_type {
                println!("  {:<16}{amount}", income_type.as_str());
            }
            println!("Expenses:         {}", summary.total_expenses);
            for category in &summary.expenses_by_category {
                println!("  {:<16}{}", category.name, category.total);
            }
            println!("Net income:       {}", summary.net_income);
            println!("Operating income: {}", summary.operating_income);
            println!("Total assets:     {}", summary.total_assets);
        }
        Commands::DebtStatus { id } => {
            let position = engine.get_debt_status(DebtId::from_uuid(id)).await?;
            println!(
                "{} outstanding {} paid {} of {}",
                position.status.as_str(),
                position.outstanding,
                position.amount_paid,
                position.original_amount
            );
        }
        Commands::Debts { overdue } => {
            let filter = DebtFilter {
                overdue_on: overdue.then_some(today),
                ..DebtFilter::default()
            };
            for debt in engine.list_debts(filter).await? {
                let position = debt.position();
                println!(
                    "{} {:?} {:<24} {:>14} {:<8} due {}",
                    debt.id,
                    debt.direction,
                    debt.counterparty,
                    position.outstanding,
                    position.status.as_str(),
                    debt.due_date
                        .map_or_else(|| "-".to_string(), |d| d.to_string()),
                );
            }
        }
        Commands::Record(command) => {
            let input = record_input(command, today);
            let recorded = engine.record_business_event(input).await?;
            println!(
                "{} {} {} -> balance {}",
                recorded.event.id,
                recorded.event.kind,
                recorded.event.cash_delta,
                recorded.cash.money()
            );
        }
        Commands::Assets { all } => {
            for asset in engine.list_assets(all).await? {
                println!(
                    "{} {:<12} {:<32} {:>16} {}",
                    asset.id,
                    asset.asset_type,
                    asset.name,
                    asset.current_value,
                    if asset.is_active { "" } else { "retired" }
                );
            }
            println!("Total: {}", engine.total_assets().await?);
        }
        Commands::Asset(command) => {
            let asset = match command {
                AssetCommands::Add {
                    name,
                    asset_type,
                    price,
                    value,
                    purchased,
                    location,
                    supplier,
                    warranty,
                } => {
                    engine
                        .create_asset(CreateAssetInput {
                            name,
                            asset_type,
                            description: None,
                            purchase_price: price,
                            current_value: value.unwrap_or(price),
                            purchase_date: purchased.unwrap_or(today),
                            location,
                            supplier,
                            warranty_expiry: warranty,
                        })
                        .await?
                }
                AssetCommands::Revalue { id, value } => {
                    engine.revalue_asset(AssetId::from_uuid(id), value).await?
                }
                AssetCommands::Retire { id } => engine.retire_asset(AssetId::from_uuid(id)).await?,
            };
            println!("{} {} {}", asset.id, asset.name, asset.current_value);
        }
    }

    Ok(())
}

fn record_input(command: RecordCommands, today: NaiveDate) -> RecordEventInput {
    let (amount, date, details) = match command {
        RecordCommands::Deposit {
            amount,
            comment,
            date,
        } => (amount, date, EventDetails::Deposit { comment }),
        RecordCommands::Withdrawal {
            amount,
            comment,
            date,
        } => (amount, date, EventDetails::Withdrawal { comment }),
        RecordCommands::Expense {
            amount,
            category,
            description,
            supplier,
            date,
        } => (
            amount,
            date,
            EventDetails::Expense {
                category_id: ExpenseCategoryId::from_uuid(category),
                description,
                supplier,
                invoice_number: None,
                payment_method: None,
            },
        ),
        RecordCommands::Income {
            amount,
            income_type,
            description,
            date,
        } => (
            amount,
            date,
            EventDetails::Income {
                income_type,
                description,
                order_reference: None,
            },
        ),
        RecordCommands::DebtPayment {
            amount,
            debt,
            comment,
            date,
        } => (
            amount,
            date,
            EventDetails::DebtPayment {
                debt_id: DebtId::from_uuid(debt),
                comment,
            },
        ),
    };

    RecordEventInput {
        amount,
        date: date.unwrap_or(today),
        recorded_by: None,
        details,
    }
}
