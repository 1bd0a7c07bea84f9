//! Journal repository: drafts, posting and entry queries.
//!
//! Every write runs in one database transaction: the period gate, reference
//! lookups, validation and the inserts either all happen or none do.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use kassa_core::correspondence::{CorrespondenceFinding, CorrespondenceRules};
use kassa_core::ledger::{
    AccountInfo, AnalyticalInfo, CreateDraftInput, EntryStatus, JournalEntry, JournalLine,
    JournalLineInput, JournalService, LedgerError, PostEntryInput,
};
use kassa_shared::types::{
    AccountId, AnalyticalAccountId, JournalEntryId, JournalLineId, StandardOperationId, UserId,
};
use kassa_shared::{CorrespondencePolicy, RetryConfig};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::correspondence::load_rules;
use super::period::ensure_open;
use crate::entities::sea_orm_active_enums::EntryStatus as DbEntryStatus;
use crate::entities::{accounts, analytical_accounts, journal_entries, journal_lines};
use crate::error::RepositoryResult;
use crate::retry::with_retry;

/// Filter options for listing journal entries.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    /// Only entries in this state.
    pub status: Option<EntryStatus>,
    /// Entries dated on or after this day.
    pub date_from: Option<NaiveDate>,
    /// Entries dated on or before this day.
    pub date_to: Option<NaiveDate>,
    /// Entries with at least one line on this account.
    pub account_id: Option<AccountId>,
    /// Entries created from this standard operation.
    pub standard_operation_id: Option<StandardOperationId>,
}

/// A posted entry together with the correspondence findings logged for it.
#[derive(Debug, Clone)]
pub struct PostedEntry {
    /// The posted entry.
    pub entry: JournalEntry,
    /// Non-blocking correspondence findings.
    pub warnings: Vec<CorrespondenceFinding>,
}

/// Journal repository.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
    policy: CorrespondencePolicy,
    retry: RetryConfig,
}

impl JournalRepository {
    /// Creates a journal repository with the warn-only correspondence policy.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            policy: CorrespondencePolicy::default(),
            retry: RetryConfig::default(),
        }
    }

    /// Sets the correspondence policy applied to manually authored entries.
    #[must_use]
    pub const fn with_policy(mut self, policy: CorrespondencePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the retry budget for serialization conflicts.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Validates and posts a manually authored entry in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` for an empty, malformed or unbalanced entry, a
    /// bad account reference, a closed period, or a rejected correspondence.
    pub async fn post_entry(&self, input: PostEntryInput) -> RepositoryResult<PostedEntry> {
        let input = &input;
        with_retry(&self.retry, move || async move {
            let txn = self.db.begin().await?;
            let posted = self.post_new_in(&txn, input, None, true).await?;
            txn.commit().await?;
            Ok(posted)
        })
        .await
        .inspect(|posted| log_posted(&posted.entry))
    }

    /// Posts lines generated by a standard operation.
    ///
    /// Template output is trusted: correspondence is not checked.
    pub(crate) async fn post_generated<C>(
        &self,
        conn: &C,
        input: &PostEntryInput,
        standard_operation_id: StandardOperationId,
    ) -> RepositoryResult<JournalEntry>
    where
        C: ConnectionTrait,
    {
        let posted = self
            .post_new_in(conn, input, Some(standard_operation_id), false)
            .await?;
        Ok(posted.entry)
    }

    async fn post_new_in<C>(
        &self,
        conn: &C,
        input: &PostEntryInput,
        standard_operation_id: Option<StandardOperationId>,
        check_correspondence: bool,
    ) -> RepositoryResult<PostedEntry>
    where
        C: ConnectionTrait,
    {
        ensure_open(conn, input.date).await?;

        let refs = References::load(conn, &input.lines).await?;
        let totals = JournalService::validate_for_posting(
            &input.lines,
            |id| refs.account(id),
            |id| refs.analytical(id),
        )?;
        tracing::debug!(debit = %totals.debit, credit = %totals.credit, "Entry validated");

        let warnings = if check_correspondence {
            self.check_correspondence(conn, &input.lines).await?
        } else {
            Vec::new()
        };

        let entry = insert_entry(
            conn,
            NewEntry {
                date: input.date,
                memo: &input.memo,
                created_by: input.created_by,
                status: EntryStatus::Posted,
                standard_operation_id,
            },
            &input.lines,
        )
        .await?;

        Ok(PostedEntry { entry, warnings })
    }

    /// Applies the correspondence policy to the lines and logs what it finds.
    async fn check_correspondence<C>(
        &self,
        conn: &C,
        lines: &[JournalLineInput],
    ) -> RepositoryResult<Vec<CorrespondenceFinding>>
    where
        C: ConnectionTrait,
    {
        let rules = load_rules(conn, lines).await?;
        let findings = CorrespondenceRules::check(lines, |d, c| rules.get(&(d, c)).cloned());
        for finding in &findings {
            tracing::warn!(
                debit_account_id = %finding.debit_account_id,
                credit_account_id = %finding.credit_account_id,
                kind = ?finding.kind,
                message = finding.message.as_deref().unwrap_or(""),
                "Correspondence finding"
            );
        }
        CorrespondenceRules::enforce(self.policy, &findings)?;
        Ok(findings)
    }

    /// Creates an empty draft entry.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::PeriodClosed` if the date is inside a closed period.
    pub async fn create_draft(&self, input: CreateDraftInput) -> RepositoryResult<JournalEntry> {
        let txn = self.db.begin().await?;
        ensure_open(&txn, input.date).await?;
        let entry = insert_entry(
            &txn,
            NewEntry {
                date: input.date,
                memo: &input.memo,
                created_by: input.created_by,
                status: EntryStatus::Draft,
                standard_operation_id: None,
            },
            &[],
        )
        .await?;
        txn.commit().await?;

        tracing::info!(entry_id = %entry.id, date = %entry.date, "Draft entry created");
        Ok(entry)
    }

    /// Creates a draft pre-filled with lines generated by a standard operation.
    pub(crate) async fn create_generated_draft(
        &self,
        input: &PostEntryInput,
        standard_operation_id: StandardOperationId,
    ) -> RepositoryResult<JournalEntry> {
        let txn = self.db.begin().await?;
        ensure_open(&txn, input.date).await?;

        let refs = References::load(&txn, &input.lines).await?;
        for (index, line) in input.lines.iter().enumerate() {
            JournalService::validate_draft_line(
                line,
                index,
                |id| refs.account(id),
                |id| refs.analytical(id),
            )?;
        }

        let entry = insert_entry(
            &txn,
            NewEntry {
                date: input.date,
                memo: &input.memo,
                created_by: input.created_by,
                status: EntryStatus::Draft,
                standard_operation_id: Some(standard_operation_id),
            },
            &input.lines,
        )
        .await?;
        txn.commit().await?;

        tracing::info!(
            entry_id = %entry.id,
            standard_operation_id = %standard_operation_id,
            lines = entry.lines.len(),
            "Draft entry generated from standard operation"
        );
        Ok(entry)
    }

    /// Appends a line to a draft entry.
    ///
    /// The draft may be unbalanced afterwards; balance is enforced when the
    /// draft is posted.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound`, `CannotModifyPosted`, `PeriodClosed`, or a
    /// line/reference validation error.
    pub async fn add_line(
        &self,
        entry_id: JournalEntryId,
        line: JournalLineInput,
    ) -> RepositoryResult<JournalEntry> {
        let line = &line;
        let entry = with_retry(&self.retry, move || async move {
            let txn = self.db.begin().await?;
            let header = lock_entry(&txn, entry_id).await?;
            JournalService::validate_can_modify(header.status.into())?;
            ensure_open(&txn, header.entry_date).await?;

            let existing = load_lines(&txn, &[header.id]).await?;
            let refs = References::load(&txn, std::slice::from_ref(line)).await?;
            JournalService::validate_draft_line(
                line,
                existing.len(),
                |id| refs.account(id),
                |id| refs.analytical(id),
            )?;

            let line_no = existing.last().map_or(1, |l| l.line_no + 1);
            let inserted = line_model(header.id, line_no, line).insert(&txn).await?;

            let mut lines = existing;
            lines.push(inserted);
            txn.commit().await?;
            Ok(to_entry(header, lines))
        })
        .await?;

        let totals = entry.totals();
        tracing::info!(
            entry_id = %entry_id,
            lines = entry.lines.len(),
            balanced = totals.is_balanced,
            "Line added to draft entry"
        );
        Ok(entry)
    }

    /// Validates and posts a draft entry.
    ///
    /// Drafts generated from a standard operation skip the correspondence
    /// check.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound`, `CannotModifyPosted`, `PeriodClosed`, or any
    /// posting validation error.
    pub async fn post_draft(&self, entry_id: JournalEntryId) -> RepositoryResult<PostedEntry> {
        with_retry(&self.retry, move || async move {
            let txn = self.db.begin().await?;
            let header = lock_entry(&txn, entry_id).await?;
            JournalService::validate_can_modify(header.status.into())?;
            ensure_open(&txn, header.entry_date).await?;

            let lines = load_lines(&txn, &[header.id]).await?;
            let inputs: Vec<JournalLineInput> = lines.iter().map(line_input).collect();
            let refs = References::load(&txn, &inputs).await?;
            JournalService::validate_for_posting(
                &inputs,
                |id| refs.account(id),
                |id| refs.analytical(id),
            )?;

            let warnings = if header.standard_operation_id.is_none() {
                self.check_correspondence(&txn, &inputs).await?
            } else {
                Vec::new()
            };

            let mut active: journal_entries::ActiveModel = header.into();
            active.status = Set(EntryStatus::Posted.into());
            active.posted_at = Set(Some(Utc::now().into()));
            let posted = active.update(&txn).await?;

            txn.commit().await?;
            Ok(PostedEntry {
                entry: to_entry(posted, lines),
                warnings,
            })
        })
        .await
        .inspect(|posted| log_posted(&posted.entry))
    }

    /// Deletes a draft entry and its lines.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` or `CanOnlyDeleteDraft`.
    pub async fn delete_draft(&self, entry_id: JournalEntryId) -> RepositoryResult<()> {
        let txn = self.db.begin().await?;
        let header = lock_entry(&txn, entry_id).await?;
        JournalService::validate_can_delete(header.status.into())?;

        journal_entries::Entity::delete_by_id(header.id)
            .exec(&txn)
            .await?;
        txn.commit().await?;

        tracing::info!(entry_id = %entry_id, "Draft entry deleted");
        Ok(())
    }

    /// Gets an entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::EntryNotFound` if the entry does not exist.
    pub async fn get_entry(&self, entry_id: JournalEntryId) -> RepositoryResult<JournalEntry> {
        let header = journal_entries::Entity::find_by_id(entry_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(LedgerError::EntryNotFound(entry_id))?;
        let lines = load_lines(&self.db, &[header.id]).await?;
        Ok(to_entry(header, lines))
    }

    /// Lists entries with their lines, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_entries(&self, filter: EntryFilter) -> RepositoryResult<Vec<JournalEntry>> {
        let mut query = journal_entries::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(journal_entries::Column::Status.eq(DbEntryStatus::from(status)));
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(journal_entries::Column::EntryDate.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(journal_entries::Column::EntryDate.lte(date_to));
        }
        if let Some(template) = filter.standard_operation_id {
            query = query
                .filter(journal_entries::Column::StandardOperationId.eq(template.into_inner()));
        }
        if let Some(account) = filter.account_id {
            query = query.filter(
                journal_entries::Column::Id.in_subquery(
                    sea_orm::sea_query::Query::select()
                        .column(journal_lines::Column::EntryId)
                        .from(journal_lines::Entity)
                        .and_where(
                            Expr::col(journal_lines::Column::AccountId).eq(account.into_inner()),
                        )
                        .to_owned(),
                ),
            );
        }

        let headers = query
            .order_by_desc(journal_entries::Column::EntryDate)
            .order_by_desc(journal_entries::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();
        let mut by_entry: HashMap<Uuid, Vec<journal_lines::Model>> = HashMap::new();
        for line in load_lines(&self.db, &ids).await? {
            by_entry.entry(line.entry_id).or_default().push(line);
        }

        Ok(headers
            .into_iter()
            .map(|h| {
                let lines = by_entry.remove(&h.id).unwrap_or_default();
                to_entry(h, lines)
            })
            .collect())
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Header fields of an entry about to be inserted.
pub(crate) struct NewEntry<'a> {
    pub date: NaiveDate,
    pub memo: &'a str,
    pub created_by: Option<UserId>,
    pub status: EntryStatus,
    pub standard_operation_id: Option<StandardOperationId>,
}

/// Inserts an entry header and its lines.
pub(crate) async fn insert_entry<C>(
    conn: &C,
    header: NewEntry<'_>,
    lines: &[JournalLineInput],
) -> RepositoryResult<JournalEntry>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let entry_id = JournalEntryId::new().into_inner();

    let model = journal_entries::ActiveModel {
        id: Set(entry_id),
        entry_date: Set(header.date),
        memo: Set(header.memo.trim().to_string()),
        status: Set(header.status.into()),
        created_by: Set(header.created_by.map(UserId::into_inner)),
        created_at: Set(now.into()),
        posted_at: Set((header.status == EntryStatus::Posted).then(|| now.into())),
        standard_operation_id: Set(header.standard_operation_id.map(StandardOperationId::into_inner)),
    }
    .insert(conn)
    .await?;

    let mut inserted = Vec::with_capacity(lines.len());
    for (line_no, line) in (1..).zip(lines) {
        inserted.push(line_model(entry_id, line_no, line).insert(conn).await?);
    }

    Ok(to_entry(model, inserted))
}

fn line_model(entry_id: Uuid, line_no: i32, line: &JournalLineInput) -> journal_lines::ActiveModel {
    journal_lines::ActiveModel {
        id: Set(JournalLineId::new().into_inner()),
        entry_id: Set(entry_id),
        line_no: Set(line_no),
        account_id: Set(line.account_id.into_inner()),
        analytical_account_id: Set(line.analytical_account_id.map(AnalyticalAccountId::into_inner)),
        description: Set(line.description.clone()),
        debit: Set(line.debit),
        credit: Set(line.credit),
    }
}

async fn lock_entry<C>(conn: &C, entry_id: JournalEntryId) -> RepositoryResult<journal_entries::Model>
where
    C: ConnectionTrait,
{
    let header = journal_entries::Entity::find_by_id(entry_id.into_inner())
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or(LedgerError::EntryNotFound(entry_id))?;
    Ok(header)
}

async fn load_lines<C>(conn: &C, entry_ids: &[Uuid]) -> RepositoryResult<Vec<journal_lines::Model>>
where
    C: ConnectionTrait,
{
    if entry_ids.is_empty() {
        return Ok(Vec::new());
    }
    let lines = journal_lines::Entity::find()
        .filter(journal_lines::Column::EntryId.is_in(entry_ids.iter().copied()))
        .order_by_asc(journal_lines::Column::EntryId)
        .order_by_asc(journal_lines::Column::LineNo)
        .all(conn)
        .await?;
    Ok(lines)
}

/// Account and analytical account data referenced by a set of lines.
struct References {
    accounts: HashMap<AccountId, AccountInfo>,
    analytical: HashMap<AnalyticalAccountId, AnalyticalInfo>,
}

impl References {
    async fn load<C>(conn: &C, lines: &[JournalLineInput]) -> RepositoryResult<Self>
    where
        C: ConnectionTrait,
    {
        let account_ids: Vec<Uuid> = lines.iter().map(|l| l.account_id.into_inner()).collect();
        let analytical_ids: Vec<Uuid> = lines
            .iter()
            .filter_map(|l| l.analytical_account_id.map(AnalyticalAccountId::into_inner))
            .collect();

        let accounts = if account_ids.is_empty() {
            HashMap::new()
        } else {
            accounts::Entity::find()
                .filter(accounts::Column::Id.is_in(account_ids))
                .all(conn)
                .await?
                .into_iter()
                .map(|m| {
                    let id = AccountId::from_uuid(m.id);
                    (
                        id,
                        AccountInfo {
                            id,
                            is_active: m.is_active,
                        },
                    )
                })
                .collect()
        };

        let analytical = if analytical_ids.is_empty() {
            HashMap::new()
        } else {
            analytical_accounts::Entity::find()
                .filter(analytical_accounts::Column::Id.is_in(analytical_ids))
                .all(conn)
                .await?
                .into_iter()
                .map(|m| {
                    let id = AnalyticalAccountId::from_uuid(m.id);
                    (
                        id,
                        AnalyticalInfo {
                            id,
                            parent_account_id: AccountId::from_uuid(m.parent_account_id),
                            is_active: m.is_active,
                        },
                    )
                })
                .collect()
        };

        tracing::debug!(
            accounts = accounts.len(),
            analytical = analytical.len(),
            "Loaded line references"
        );
        Ok(Self {
            accounts,
            analytical,
        })
    }

    fn account(&self, id: AccountId) -> Option<AccountInfo> {
        self.accounts.get(&id).cloned()
    }

    fn analytical(&self, id: AnalyticalAccountId) -> Option<AnalyticalInfo> {
        self.analytical.get(&id).cloned()
    }
}

fn line_input(line: &journal_lines::Model) -> JournalLineInput {
    JournalLineInput {
        account_id: AccountId::from_uuid(line.account_id),
        analytical_account_id: line.analytical_account_id.map(AnalyticalAccountId::from_uuid),
        description: line.description.clone(),
        debit: line.debit,
        credit: line.credit,
    }
}

fn to_entry(header: journal_entries::Model, lines: Vec<journal_lines::Model>) -> JournalEntry {
    JournalEntry {
        id: JournalEntryId::from_uuid(header.id),
        date: header.entry_date,
        memo: header.memo,
        status: header.status.into(),
        created_by: header.created_by.map(UserId::from_uuid),
        created_at: header.created_at.with_timezone(&Utc),
        posted_at: header.posted_at.map(|t| t.with_timezone(&Utc)),
        standard_operation_id: header.standard_operation_id.map(StandardOperationId::from_uuid),
        lines: lines
            .into_iter()
            .map(|l| JournalLine {
                id: JournalLineId::from_uuid(l.id),
                entry_id: JournalEntryId::from_uuid(l.entry_id),
                line_no: l.line_no,
                account_id: AccountId::from_uuid(l.account_id),
                analytical_account_id: l.analytical_account_id.map(AnalyticalAccountId::from_uuid),
                description: l.description,
                debit: l.debit,
                credit: l.credit,
            })
            .collect(),
    }
}

fn log_posted(entry: &JournalEntry) {
    let totals = entry.totals();
    tracing::info!(
        entry_id = %entry.id,
        date = %entry.date,
        lines = entry.lines.len(),
        amount = %totals.debit,
        "Journal entry posted"
    );
}
