//! The ledger engine: one handle over every repository.
//!
//! The engine is what binaries and embedding services talk to. It shares a
//! single connection pool across repositories, applies [`LedgerConfig`]
//! (cash currency, correspondence policy, retry budget) and converts every
//! repository error into [`AppError`](kassa_shared::AppError).

use chrono::NaiveDate;
use kassa_core::accounts::{
    Account, AnalyticalAccount, CreateAccountInput, CreateAnalyticalAccountInput,
};
use kassa_core::assets::{CreateAssetInput, FactoryAsset};
use kassa_core::cash::{
    BusinessEvent, CashAccount, CreateCategoryInput, EventDetails, ExpenseCategory,
    RecordEventInput,
};
use kassa_core::correspondence::{CorrespondenceFinding, CorrespondencePair};
use kassa_core::debt::{CreateDebtInput, Debt, DebtPayment, DebtPaymentInput, DebtPosition};
use kassa_core::fiscal::{CreatePeriodInput, FinancialPeriod};
use kassa_core::ledger::{CreateDraftInput, JournalEntry, JournalLineInput, PostEntryInput};
use kassa_core::reports::{AccountStatement, CashDashboard, FinancialSummary, TrialBalance};
use kassa_core::templates::{CreateTemplateInput, PercentOverrides, StandardOperation};
use kassa_shared::types::{
    AccountId, AssetId, BusinessEventId, DebtId, ExpenseCategoryId, FinancialPeriodId, JournalEntryId,
    StandardOperationId, UserId,
};
use kassa_shared::{AppResult, LedgerConfig};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

use crate::repositories::{
    AccountRepository, AssetRepository, CashLedger, CategoryRepository, CorrespondenceRepository, DebtFilter,
    DebtRepository, EntryFilter, EventFilter, EventRepository, ExpandInput, JournalRepository,
    PeriodRepository, PostedEntry, RecordedEvent, RecordedPayment, ReportRepository,
    TemplateRepository, UpsertPairInput,
};

/// Facade over the cash ledger, the journal and the reports.
#[derive(Debug, Clone)]
pub struct LedgerEngine {
    accounts: AccountRepository,
    correspondence: CorrespondenceRepository,
    journal: JournalRepository,
    templates: TemplateRepository,
    periods: PeriodRepository,
    cash: CashLedger,
    events: EventRepository,
    debts: DebtRepository,
    categories: CategoryRepository,
    assets: AssetRepository,
    reports: ReportRepository,
}

impl LedgerEngine {
    /// Builds the engine on an existing connection pool.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: &LedgerConfig) -> Self {
        let currency = config.currency;
        let retry = config.retry;
        Self {
            accounts: AccountRepository::new(db.clone()).with_retry(retry),
            correspondence: CorrespondenceRepository::new(db.clone()),
            journal: JournalRepository::new(db.clone())
                .with_policy(config.correspondence_policy)
                .with_retry(retry),
            templates: TemplateRepository::new(db.clone()).with_retry(retry),
            periods: PeriodRepository::new(db.clone()),
            cash: CashLedger::new(db.clone(), currency).with_retry(retry),
            events: EventRepository::new(db.clone(), currency).with_retry(retry),
            debts: DebtRepository::new(db.clone(), currency).with_retry(retry),
            categories: CategoryRepository::new(db.clone()).with_retry(retry),
            assets: AssetRepository::new(db.clone()),
            reports: ReportRepository::new(db, currency),
        }
    }

    // Cash

    /// Returns the operating cash balance and its currency.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the balance cannot be read.
    pub async fn get_cash_balance(&self) -> AppResult<CashAccount> {
        Ok(self.cash.get_balance().await?)
    }

    /// Adds a signed amount to the cash balance outside of any event.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Conflict` if the retry budget runs out.
    pub async fn apply_delta(&self, delta: Decimal) -> AppResult<CashAccount> {
        Ok(self.cash.apply_delta(delta).await?)
    }

    /// Records a deposit, withdrawal, expense, income or debt payment and
    /// applies its cash delta exactly once.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a bad amount or metadata and
    /// `AppError::NotFound` for an unknown category or debt.
    pub async fn record_business_event(&self, input: RecordEventInput) -> AppResult<RecordedEvent> {
        Ok(self.events.record_business_event(input).await?)
    }

    /// Edits an event's metadata without touching the cash balance.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown event and
    /// `AppError::BusinessRule` for a change of kind or debt.
    pub async fn update_event_metadata(
        &self,
        event_id: BusinessEventId,
        details: EventDetails,
    ) -> AppResult<BusinessEvent> {
        Ok(self.events.update_event_metadata(event_id, details).await?)
    }

    /// Gets a business event.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown event.
    pub async fn get_event(&self, event_id: BusinessEventId) -> AppResult<BusinessEvent> {
        Ok(self.events.get_event(event_id).await?)
    }

    /// Lists business events, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_events(&self, filter: EventFilter) -> AppResult<Vec<BusinessEvent>> {
        Ok(self.events.list_events(filter).await?)
    }

    // Expense categories

    /// Creates an expense category.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank name or
    /// `AppError::NotFound` for an unknown parent.
    pub async fn create_category(&self, input: CreateCategoryInput) -> AppResult<ExpenseCategory> {
        Ok(self.categories.create_category(input).await?)
    }

    /// Moves an expense category.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BusinessRule` if the move would create a cycle.
    pub async fn set_category_parent(
        &self,
        id: ExpenseCategoryId,
        parent: Option<ExpenseCategoryId>,
    ) -> AppResult<ExpenseCategory> {
        Ok(self.categories.set_parent(id, parent).await?)
    }

    /// Lists expense categories.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_categories(&self) -> AppResult<Vec<ExpenseCategory>> {
        Ok(self.categories.list_categories().await?)
    }

    // Account directory

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` or `AppError::BusinessRule` when the
    /// directory rejects the account.
    pub async fn create_account(&self, input: CreateAccountInput) -> AppResult<Account> {
        Ok(self.accounts.create_account(input).await?)
    }

    /// Creates an analytical account under an existing account.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown owner.
    pub async fn create_analytical_account(
        &self,
        input: CreateAnalyticalAccountInput,
    ) -> AppResult<AnalyticalAccount> {
        Ok(self.accounts.create_analytical_account(input).await?)
    }

    /// Finds an account by code.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn find_account_by_code(&self, code: &str) -> AppResult<Option<Account>> {
        Ok(self.accounts.find_by_code(code).await?)
    }

    /// Lists accounts by code.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_accounts(&self, include_inactive: bool) -> AppResult<Vec<Account>> {
        Ok(self.accounts.list_accounts(include_inactive).await?)
    }

    /// Lists analytical accounts, optionally of one owner.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_analytical_accounts(
        &self,
        parent: Option<AccountId>,
    ) -> AppResult<Vec<AnalyticalAccount>> {
        Ok(self.accounts.list_analytical_accounts(parent).await?)
    }

    /// Deactivates an account.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown account.
    pub async fn deactivate_account(&self, id: AccountId) -> AppResult<Account> {
        Ok(self.accounts.deactivate_account(id).await?)
    }

    /// Moves an account in the tree.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BusinessRule` if the move would create a cycle.
    pub async fn set_account_parent(
        &self,
        id: AccountId,
        parent: Option<AccountId>,
    ) -> AppResult<Account> {
        Ok(self.accounts.set_parent(id, parent).await?)
    }

    // Correspondence

    /// Creates or replaces the rule for a debit/credit account pair.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown account.
    pub async fn upsert_correspondence(
        &self,
        input: UpsertPairInput,
    ) -> AppResult<CorrespondencePair> {
        Ok(self.correspondence.upsert_pair(input).await?)
    }

    /// Lists correspondence rules.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_correspondence(&self) -> AppResult<Vec<CorrespondencePair>> {
        Ok(self.correspondence.list_pairs().await?)
    }

    /// Checks the account pairs of a set of lines without posting them.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the rules cannot be loaded.
    pub async fn check_correspondence(
        &self,
        lines: &[JournalLineInput],
    ) -> AppResult<Vec<CorrespondenceFinding>> {
        Ok(self.correspondence.check_lines(lines).await?)
    }

    // Journal

    /// Validates and posts a manual entry atomically.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an empty, malformed or unbalanced
    /// entry and `AppError::PeriodClosed` for a date in a closed period.
    pub async fn post_journal_entry(&self, input: PostEntryInput) -> AppResult<PostedEntry> {
        Ok(self.journal.post_entry(input).await?)
    }

    /// Creates an empty draft entry.
    ///
    /// # Errors
    ///
    /// Returns `AppError::PeriodClosed` for a date in a closed period.
    pub async fn create_draft(&self, input: CreateDraftInput) -> AppResult<JournalEntry> {
        Ok(self.journal.create_draft(input).await?)
    }

    /// Appends a line to a draft.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BusinessRule` if the entry is already posted.
    pub async fn add_line(
        &self,
        entry_id: JournalEntryId,
        line: JournalLineInput,
    ) -> AppResult<JournalEntry> {
        Ok(self.journal.add_line(entry_id, line).await?)
    }

    /// Posts a draft after checking every posting invariant.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the draft does not balance.
    pub async fn post_draft(&self, entry_id: JournalEntryId) -> AppResult<PostedEntry> {
        Ok(self.journal.post_draft(entry_id).await?)
    }

    /// Deletes a draft and its lines.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BusinessRule` if the entry is posted.
    pub async fn delete_draft(&self, entry_id: JournalEntryId) -> AppResult<()> {
        Ok(self.journal.delete_draft(entry_id).await?)
    }

    /// Gets an entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown entry.
    pub async fn get_entry(&self, entry_id: JournalEntryId) -> AppResult<JournalEntry> {
        Ok(self.journal.get_entry(entry_id).await?)
    }

    /// Lists entries with their lines.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_entries(&self, filter: EntryFilter) -> AppResult<Vec<JournalEntry>> {
        Ok(self.journal.list_entries(filter).await?)
    }

    // Standard operations

    /// Validates and stores a standard operation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the percents do not total 100 per
    /// side.
    pub async fn create_template(&self, input: CreateTemplateInput) -> AppResult<StandardOperation> {
        Ok(self.templates.create_template(input).await?)
    }

    /// Gets a standard operation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown template.
    pub async fn get_template(&self, id: StandardOperationId) -> AppResult<StandardOperation> {
        Ok(self.templates.get_template(id).await?)
    }

    /// Lists standard operations.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_templates(&self, include_inactive: bool) -> AppResult<Vec<StandardOperation>> {
        Ok(self.templates.list_templates(include_inactive).await?)
    }

    /// Activates or deactivates a standard operation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown template.
    pub async fn set_template_active(
        &self,
        id: StandardOperationId,
        is_active: bool,
    ) -> AppResult<StandardOperation> {
        Ok(self.templates.set_active(id, is_active).await?)
    }

    /// Previews the lines a standard operation produces for `total`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a bad total or override.
    pub async fn preview_standard_operation(
        &self,
        id: StandardOperationId,
        total: Decimal,
        overrides: &PercentOverrides,
    ) -> AppResult<Vec<JournalLineInput>> {
        Ok(self.templates.expand(id, total, overrides).await?)
    }

    /// Expands a standard operation into a draft entry.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BusinessRule` for an inactive template and
    /// `AppError::Validation` for a bad total or override.
    pub async fn expand_standard_operation(&self, input: ExpandInput) -> AppResult<JournalEntry> {
        Ok(self.templates.expand_to_draft(input).await?)
    }

    /// Expands a standard operation and posts it in one transaction.
    ///
    /// # Errors
    ///
    /// Returns expansion errors or `AppError::PeriodClosed`.
    pub async fn expand_and_post(&self, input: ExpandInput) -> AppResult<JournalEntry> {
        Ok(self.templates.expand_and_post(input).await?)
    }

    // Financial periods

    /// Creates an open financial period.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BusinessRule` if it overlaps a period of the same
    /// type.
    pub async fn create_period(&self, input: CreatePeriodInput) -> AppResult<FinancialPeriod> {
        Ok(self.periods.create_period(input).await?)
    }

    /// Closes a financial period for good.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BusinessRule` if the period is already closed or
    /// still holds drafts.
    pub async fn close_period(
        &self,
        id: FinancialPeriodId,
        closed_by: Option<UserId>,
    ) -> AppResult<FinancialPeriod> {
        Ok(self.periods.close_period(id, closed_by).await?)
    }

    /// Lists financial periods by start date.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_periods(&self) -> AppResult<Vec<FinancialPeriod>> {
        Ok(self.periods.list_periods().await?)
    }

    // Debts

    /// Creates a payable or receivable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a bad amount or a blank field.
    pub async fn create_debt(&self, input: CreateDebtInput) -> AppResult<Debt> {
        Ok(self.debts.create_debt(input).await?)
    }

    /// Records a debt payment and its cash effect atomically.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown debt.
    pub async fn record_debt_payment(&self, input: DebtPaymentInput) -> AppResult<RecordedPayment> {
        Ok(self.debts.record_payment(input).await?)
    }

    /// Gets a debt.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown debt.
    pub async fn get_debt(&self, id: DebtId) -> AppResult<Debt> {
        Ok(self.debts.get_debt(id).await?)
    }

    /// Returns the outstanding amount and status of a debt.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown debt.
    pub async fn get_debt_status(&self, id: DebtId) -> AppResult<DebtPosition> {
        Ok(self.debts.get_debt_status(id).await?)
    }

    /// Lists debts.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_debts(&self, filter: DebtFilter) -> AppResult<Vec<Debt>> {
        Ok(self.debts.list_debts(filter).await?)
    }

    /// Lists the payments of a debt.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown debt.
    pub async fn debt_payments(&self, id: DebtId) -> AppResult<Vec<DebtPayment>> {
        Ok(self.debts.payments(id).await?)
    }

    // Factory assets

    /// Registers a factory asset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank name or a bad value.
    pub async fn create_asset(&self, input: CreateAssetInput) -> AppResult<FactoryAsset> {
        Ok(self.assets.create_asset(input).await?)
    }

    /// Gets a factory asset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown asset.
    pub async fn get_asset(&self, id: AssetId) -> AppResult<FactoryAsset> {
        Ok(self.assets.get_asset(id).await?)
    }

    /// Lists factory assets, most valuable first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_assets(&self, include_inactive: bool) -> AppResult<Vec<FactoryAsset>> {
        Ok(self.assets.list_assets(include_inactive).await?)
    }

    /// Sets the current value of an asset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BusinessRule` for a retired asset.
    pub async fn revalue_asset(&self, id: AssetId, current_value: Decimal) -> AppResult<FactoryAsset> {
        Ok(self.assets.revalue_asset(id, current_value).await?)
    }

    /// Writes an asset off.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown asset.
    pub async fn retire_asset(&self, id: AssetId) -> AppResult<FactoryAsset> {
        Ok(self.assets.retire_asset(id).await?)
    }

    /// Current value of all active assets.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn total_assets(&self) -> AppResult<Decimal> {
        Ok(self.assets.total_assets().await?)
    }

    // Reports

    /// Trial balance over posted entries dated on or before `as_of`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn get_trial_balance(&self, as_of: Option<NaiveDate>) -> AppResult<TrialBalance> {
        Ok(self.reports.get_trial_balance(as_of).await?)
    }

    /// Turnover statement of one account.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown account and
    /// `AppError::Validation` for an inverted range.
    pub async fn account_statement(
        &self,
        account_id: AccountId,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> AppResult<AccountStatement> {
        Ok(self
            .reports
            .account_statement(account_id, date_from, date_to)
            .await?)
    }

    /// Income and expenses over `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an inverted range.
    pub async fn financial_summary(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<FinancialSummary> {
        Ok(self.reports.financial_summary(start, end).await?)
    }

    /// Cash balance with the month's income and expenses.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn cash_dashboard(&self, today: NaiveDate) -> AppResult<CashDashboard> {
        Ok(self.reports.cash_dashboard(today).await?)
    }
}
