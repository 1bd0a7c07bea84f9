//! Standard operation repository.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use kassa_core::accounts::AccountError;
use kassa_core::ledger::{JournalEntry, JournalLineInput, LedgerError, PostEntryInput};
use kassa_core::templates::{
    CreateTemplateInput, PercentOverrides, StandardOperation, StandardOperationLine,
    TemplateError, TemplateExpander,
};
use kassa_shared::RetryConfig;
use kassa_shared::types::{AccountId, AnalyticalAccountId, StandardOperationId, UserId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::account::missing_accounts;
use super::journal::JournalRepository;
use crate::entities::{analytical_accounts, standard_operation_lines, standard_operations};
use crate::error::RepositoryResult;
use crate::retry::with_retry;

/// Input for expanding a standard operation into a journal entry.
#[derive(Debug, Clone)]
pub struct ExpandInput {
    /// Template to expand.
    pub template_id: StandardOperationId,
    /// Total amount distributed across the lines.
    pub total: Decimal,
    /// Percents for variable lines, keyed by zero-based line index.
    pub overrides: PercentOverrides,
    /// Entry date.
    pub date: NaiveDate,
    /// Entry memo; defaults to the template name.
    pub memo: Option<String>,
    /// Author.
    pub created_by: Option<UserId>,
}

/// Standard operation repository.
#[derive(Debug, Clone)]
pub struct TemplateRepository {
    db: DatabaseConnection,
    journal: JournalRepository,
    retry: RetryConfig,
}

impl TemplateRepository {
    /// Creates a new template repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            journal: JournalRepository::new(db.clone()),
            db,
            retry: RetryConfig::default(),
        }
    }

    /// Sets the retry budget for serialization conflicts.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Validates and stores a template.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError` for a bad definition, or an account error for
    /// a missing account or a mismatched analytical account.
    pub async fn create_template(
        &self,
        input: CreateTemplateInput,
    ) -> RepositoryResult<StandardOperation> {
        TemplateExpander::validate_definition(&input)?;

        let txn = self.db.begin().await?;
        check_line_references(&txn, &input.lines).await?;

        let now = Utc::now();
        let operation = standard_operations::ActiveModel {
            id: Set(StandardOperationId::new().into_inner()),
            name: Set(input.name.trim().to_string()),
            category: Set(input.category.trim().to_string()),
            description: Set(input.description.clone()),
            is_active: Set(true),
            created_by: Set(input.created_by.map(UserId::into_inner)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for (line_no, line) in (1..).zip(&input.lines) {
            let model = standard_operation_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                operation_id: Set(operation.id),
                line_no: Set(line_no),
                account_id: Set(line.account_id.into_inner()),
                analytical_account_id: Set(line
                    .analytical_account_id
                    .map(AnalyticalAccountId::into_inner)),
                description: Set(line.description.clone()),
                debit_percent: Set(line.debit_percent),
                credit_percent: Set(line.credit_percent),
                is_variable: Set(line.is_variable),
            }
            .insert(&txn)
            .await?;
            lines.push(model);
        }

        txn.commit().await?;

        tracing::info!(
            standard_operation_id = %operation.id,
            name = %operation.name,
            lines = lines.len(),
            "Standard operation created"
        );
        Ok(to_template(operation, lines))
    }

    /// Gets a template with its lines.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::NotFound` if the template does not exist.
    pub async fn get_template(&self, id: StandardOperationId) -> RepositoryResult<StandardOperation> {
        load_template(&self.db, id).await
    }

    /// Lists templates with their lines, ordered by category and name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_templates(
        &self,
        include_inactive: bool,
    ) -> RepositoryResult<Vec<StandardOperation>> {
        let mut query = standard_operations::Entity::find();
        if !include_inactive {
            query = query.filter(standard_operations::Column::IsActive.eq(true));
        }
        let operations = query
            .order_by_asc(standard_operations::Column::Category)
            .order_by_asc(standard_operations::Column::Name)
            .all(&self.db)
            .await?;

        let ids: Vec<Uuid> = operations.iter().map(|o| o.id).collect();
        let mut by_operation: HashMap<Uuid, Vec<standard_operation_lines::Model>> = HashMap::new();
        if !ids.is_empty() {
            for line in standard_operation_lines::Entity::find()
                .filter(standard_operation_lines::Column::OperationId.is_in(ids))
                .order_by_asc(standard_operation_lines::Column::LineNo)
                .all(&self.db)
                .await?
            {
                by_operation.entry(line.operation_id).or_default().push(line);
            }
        }

        Ok(operations
            .into_iter()
            .map(|o| {
                let lines = by_operation.remove(&o.id).unwrap_or_default();
                to_template(o, lines)
            })
            .collect())
    }

    /// Activates or deactivates a template.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::NotFound` if the template does not exist.
    pub async fn set_active(
        &self,
        id: StandardOperationId,
        is_active: bool,
    ) -> RepositoryResult<StandardOperation> {
        let model = standard_operations::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(TemplateError::NotFound(id))?;

        let mut active: standard_operations::ActiveModel = model.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await?;

        tracing::info!(standard_operation_id = %id, is_active, "Standard operation toggled");
        self.get_template(id).await
    }

    /// Expands a template against `total` without persisting anything.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError` if the template is missing, inactive, or the
    /// expansion is rejected.
    pub async fn expand(
        &self,
        id: StandardOperationId,
        total: Decimal,
        overrides: &PercentOverrides,
    ) -> RepositoryResult<Vec<JournalLineInput>> {
        let template = load_template(&self.db, id).await?;
        Ok(TemplateExpander::expand(&template, total, overrides)?)
    }

    /// Expands a template into a draft entry that can be reviewed and posted.
    ///
    /// # Errors
    ///
    /// Returns expansion errors, or `PeriodClosed` for a date in a closed period.
    pub async fn expand_to_draft(&self, input: ExpandInput) -> RepositoryResult<JournalEntry> {
        let template = load_template(&self.db, input.template_id).await?;
        let entry = entry_input(&template, &input)?;
        self.journal
            .create_generated_draft(&entry, input.template_id)
            .await
    }

    /// Expands a template and posts the result in one transaction.
    ///
    /// # Errors
    ///
    /// Returns expansion errors, or any posting validation error.
    pub async fn expand_and_post(&self, input: ExpandInput) -> RepositoryResult<JournalEntry> {
        let input = &input;
        let entry = with_retry(&self.retry, move || async move {
            let txn = self.db.begin().await?;
            let template = load_template(&txn, input.template_id).await?;
            let entry = entry_input(&template, input)?;
            let posted = self
                .journal
                .post_generated(&txn, &entry, input.template_id)
                .await?;
            txn.commit().await?;
            Ok(posted)
        })
        .await?;

        tracing::info!(
            entry_id = %entry.id,
            standard_operation_id = %input.template_id,
            total = %input.total,
            "Standard operation posted"
        );
        Ok(entry)
    }
}

fn entry_input(template: &StandardOperation, input: &ExpandInput) -> RepositoryResult<PostEntryInput> {
    let lines = TemplateExpander::expand(template, input.total, &input.overrides)?;
    Ok(PostEntryInput {
        date: input.date,
        memo: input
            .memo
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| template.name.clone()),
        created_by: input.created_by,
        lines,
    })
}

async fn check_line_references<C>(conn: &C, lines: &[StandardOperationLine]) -> RepositoryResult<()>
where
    C: ConnectionTrait,
{
    let account_ids: Vec<Uuid> = lines.iter().map(|l| l.account_id.into_inner()).collect();
    if let Some(missing) = missing_accounts(conn, &account_ids).await?.first() {
        return Err(AccountError::NotFound(AccountId::from_uuid(*missing)).into());
    }

    for line in lines {
        let Some(analytical_id) = line.analytical_account_id else {
            continue;
        };
        let analytical = analytical_accounts::Entity::find_by_id(analytical_id.into_inner())
            .one(conn)
            .await?
            .ok_or(AccountError::AnalyticalNotFound(analytical_id))?;
        if analytical.parent_account_id != line.account_id.into_inner() {
            return Err(LedgerError::AnalyticalAccountMismatch {
                analytical: analytical_id,
                account: line.account_id,
            }
            .into());
        }
    }
    Ok(())
}

async fn load_template<C>(conn: &C, id: StandardOperationId) -> RepositoryResult<StandardOperation>
where
    C: ConnectionTrait,
{
    let operation = standard_operations::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .ok_or(TemplateError::NotFound(id))?;
    let lines = standard_operation_lines::Entity::find()
        .filter(standard_operation_lines::Column::OperationId.eq(operation.id))
        .order_by_asc(standard_operation_lines::Column::LineNo)
        .all(conn)
        .await?;
    Ok(to_template(operation, lines))
}

fn to_template(
    operation: standard_operations::Model,
    lines: Vec<standard_operation_lines::Model>,
) -> StandardOperation {
    StandardOperation {
        id: StandardOperationId::from_uuid(operation.id),
        name: operation.name,
        category: operation.category,
        description: operation.description,
        is_active: operation.is_active,
        lines: lines
            .into_iter()
            .map(|l| StandardOperationLine {
                account_id: AccountId::from_uuid(l.account_id),
                analytical_account_id: l.analytical_account_id.map(AnalyticalAccountId::from_uuid),
                description: l.description,
                debit_percent: l.debit_percent,
                credit_percent: l.credit_percent,
                is_variable: l.is_variable,
            })
            .collect(),
        created_by: operation.created_by.map(UserId::from_uuid),
        created_at: operation.created_at.with_timezone(&Utc),
    }
}
