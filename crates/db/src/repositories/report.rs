//! Report repository.
//!
//! Aggregates posted journal lines and business events in SQL, then hands
//! the sums to [`ReportService`] for assembly.

use std::collections::HashMap;

use chrono::NaiveDate;
use kassa_core::cash::{EventKind, IncomeType};
use kassa_core::ledger::EntryStatus;
use kassa_core::reports::{
    AccountStatement, CashDashboard, CategoryTotal, FinancialSummary, ReportError, ReportService,
    TrialBalance, TrialBalanceRow,
};
use kassa_shared::types::{AccountId, Currency, ExpenseCategoryId};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};
use uuid::Uuid;

use super::asset::active_total;
use super::cash::CashLedger;
use crate::entities::sea_orm_active_enums::{EntryStatus as DbEntryStatus, EventKind as DbEventKind};
use crate::entities::{accounts, business_events, expense_categories, journal_entries, journal_lines};
use crate::error::{RepositoryError, RepositoryResult};

/// Debit and credit sums of one account.
type Sums = (Decimal, Decimal);

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
    currency: Currency,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, currency: Currency) -> Self {
        Self { db, currency }
    }

    /// Generates the trial balance over posted entries dated on or before
    /// `as_of`, or over all posted entries when `as_of` is `None`.
    ///
    /// Every account appears, including those without movement.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_trial_balance(&self, as_of: Option<NaiveDate>) -> RepositoryResult<TrialBalance> {
        let sums = self.posted_sums(None, as_of, None).await?;
        let rows = accounts::Entity::find()
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|account| {
                let (debit, credit) = sums.get(&account.id).copied().unwrap_or_default();
                to_row(account, debit, credit)
            })
            .collect();

        let report = ReportService::generate_trial_balance(rows, as_of);
        if !report.totals.is_balanced {
            tracing::error!(
                debit = %report.totals.total_debit,
                credit = %report.totals.total_credit,
                "Trial balance does not balance"
            );
        }
        Ok(report)
    }

    /// Generates the opening balance, turnover and closing balance of one
    /// account over `[date_from, date_to]`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::AccountNotFound` or `InvalidDateRange`.
    pub async fn account_statement(
        &self,
        account_id: AccountId,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> RepositoryResult<AccountStatement> {
        ReportService::validate_range(date_from, date_to)?;

        let account = accounts::Entity::find_by_id(account_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(ReportError::AccountNotFound(account_id))?;

        let before = match date_from.pred_opt() {
            Some(day_before) => self
                .posted_sums(None, Some(day_before), Some(account.id))
                .await?
                .remove(&account.id)
                .unwrap_or_default(),
            None => Sums::default(),
        };
        let within = self
            .posted_sums(Some(date_from), Some(date_to), Some(account.id))
            .await?
            .remove(&account.id)
            .unwrap_or_default();

        let row = to_row(account, before.0 + within.0, before.1 + within.1);
        Ok(ReportService::account_statement(
            &row, date_from, date_to, before, within,
        )?)
    }

    /// Summarizes income by type and expenses by category over
    /// `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange`, or `Corrupt` for an unknown stored
    /// income type.
    pub async fn financial_summary(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<FinancialSummary> {
        ReportService::validate_range(start, end)?;

        let income_rows: Vec<(Option<String>, Decimal)> = business_events::Entity::find()
            .select_only()
            .column(business_events::Column::IncomeType)
            .column_as(Expr::col(business_events::Column::Amount).sum(), "total")
            .filter(business_events::Column::Kind.eq(DbEventKind::from(EventKind::Income)))
            .filter(business_events::Column::EventDate.between(start, end))
            .group_by(business_events::Column::IncomeType)
            .into_tuple()
            .all(&self.db)
            .await?;

        let income = income_rows
            .into_iter()
            .map(|(income_type, total)| {
                let income_type = match income_type {
                    Some(raw) => raw.parse::<IncomeType>().map_err(RepositoryError::Corrupt)?,
                    None => IncomeType::Other,
                };
                Ok((income_type, total))
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        let expense_rows: Vec<(Option<Uuid>, Decimal)> = business_events::Entity::find()
            .select_only()
            .column(business_events::Column::CategoryId)
            .column_as(Expr::col(business_events::Column::Amount).sum(), "total")
            .filter(business_events::Column::Kind.eq(DbEventKind::from(EventKind::Expense)))
            .filter(business_events::Column::EventDate.between(start, end))
            .group_by(business_events::Column::CategoryId)
            .into_tuple()
            .all(&self.db)
            .await?;

        let ids: Vec<Uuid> = expense_rows.iter().filter_map(|(id, _)| *id).collect();
        let names: HashMap<Uuid, String> = if ids.is_empty() {
            HashMap::new()
        } else {
            expense_categories::Entity::find()
                .filter(expense_categories::Column::Id.is_in(ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect()
        };

        let mut expenses = Vec::with_capacity(expense_rows.len());
        for (category_id, total) in expense_rows {
            let Some(category_id) = category_id else {
                return Err(RepositoryError::Corrupt(
                    "expense event without a category".to_string(),
                ));
            };
            let name = names.get(&category_id).cloned().ok_or_else(|| {
                RepositoryError::Corrupt(format!("expense category {category_id} missing"))
            })?;
            expenses.push(CategoryTotal {
                category_id: ExpenseCategoryId::from_uuid(category_id),
                name,
                total,
            });
        }

        let total_assets = active_total(&self.db).await?;
        Ok(ReportService::financial_summary(
            start,
            end,
            &income,
            expenses,
            total_assets,
        )?)
    }

    /// Returns the cash balance with this month's income and expenses.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn cash_dashboard(&self, today: NaiveDate) -> RepositoryResult<CashDashboard> {
        let cash = CashLedger::new(self.db.clone(), self.currency)
            .get_balance()
            .await?;
        let (month_start, month_end) = ReportService::month_bounds(today);

        let totals: Vec<(DbEventKind, Decimal)> = business_events::Entity::find()
            .select_only()
            .column(business_events::Column::Kind)
            .column_as(Expr::col(business_events::Column::Amount).sum(), "total")
            .filter(business_events::Column::Kind.is_in([
                DbEventKind::from(EventKind::Income),
                DbEventKind::from(EventKind::Expense),
            ]))
            .filter(business_events::Column::EventDate.between(month_start, month_end))
            .group_by(business_events::Column::Kind)
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut income = Decimal::ZERO;
        let mut expenses = Decimal::ZERO;
        for (kind, total) in totals {
            match EventKind::from(kind) {
                EventKind::Income => income += total,
                EventKind::Expense => expenses += total,
                _ => {}
            }
        }

        let total_assets = active_total(&self.db).await?;

        Ok(ReportService::cash_dashboard(
            cash.balance,
            cash.currency,
            today,
            income,
            expenses,
            total_assets,
        ))
    }

    /// Sums debit and credit of posted lines per account, for entries dated
    /// within the inclusive bounds.
    async fn posted_sums(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        account: Option<Uuid>,
    ) -> RepositoryResult<HashMap<Uuid, Sums>> {
        let mut query = journal_lines::Entity::find()
            .select_only()
            .column(journal_lines::Column::AccountId)
            .column_as(
                Expr::col((journal_lines::Entity, journal_lines::Column::Debit)).sum(),
                "debit_total",
            )
            .column_as(
                Expr::col((journal_lines::Entity, journal_lines::Column::Credit)).sum(),
                "credit_total",
            )
            .join(JoinType::InnerJoin, journal_lines::Relation::JournalEntries.def())
            .filter(
                journal_entries::Column::Status.eq(DbEntryStatus::from(EntryStatus::Posted)),
            );
        if let Some(from) = from {
            query = query.filter(journal_entries::Column::EntryDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(journal_entries::Column::EntryDate.lte(to));
        }
        if let Some(account) = account {
            query = query.filter(journal_lines::Column::AccountId.eq(account));
        }

        let rows: Vec<(Uuid, Decimal, Decimal)> = query
            .group_by(journal_lines::Column::AccountId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(account_id, debit, credit)| (account_id, (debit, credit)))
            .collect())
    }
}

fn to_row(account: accounts::Model, debit_total: Decimal, credit_total: Decimal) -> TrialBalanceRow {
    TrialBalanceRow {
        account_id: AccountId::from_uuid(account.id),
        code: account.code,
        name: account.name,
        account_type: account.account_type.into(),
        normal_side: account.normal_side.into(),
        debit_total,
        credit_total,
    }
}
