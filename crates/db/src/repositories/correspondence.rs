//! Correspondence pair repository.

use std::collections::HashMap;

use chrono::Utc;
use kassa_core::accounts::AccountError;
use kassa_core::correspondence::{
    CorrespondenceFinding, CorrespondencePair, CorrespondenceRules, PairRule,
};
use kassa_core::ledger::JournalLineInput;
use kassa_shared::types::{AccountId, CorrespondencePairId};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::account::missing_accounts;
use crate::entities::correspondence_pairs;
use crate::error::RepositoryResult;

/// Input for creating or replacing a correspondence rule.
#[derive(Debug, Clone)]
pub struct UpsertPairInput {
    /// Debited account.
    pub debit_account_id: AccountId,
    /// Credited account.
    pub credit_account_id: AccountId,
    /// Whether the pair is allowed.
    pub is_valid: bool,
    /// Optional warning shown whenever the pair is used.
    pub description: Option<String>,
}

/// Correspondence pair repository.
#[derive(Debug, Clone)]
pub struct CorrespondenceRepository {
    db: DatabaseConnection,
}

impl CorrespondenceRepository {
    /// Creates a new correspondence repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a rule, or replaces the rule already stored for the pair.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if either account does not exist.
    pub async fn upsert_pair(&self, input: UpsertPairInput) -> RepositoryResult<CorrespondencePair> {
        let ids = [
            input.debit_account_id.into_inner(),
            input.credit_account_id.into_inner(),
        ];
        if let Some(missing) = missing_accounts(&self.db, &ids).await?.first() {
            return Err(AccountError::NotFound(AccountId::from_uuid(*missing)).into());
        }

        let now = Utc::now();
        let model = correspondence_pairs::ActiveModel {
            id: Set(CorrespondencePairId::new().into_inner()),
            debit_account_id: Set(input.debit_account_id.into_inner()),
            credit_account_id: Set(input.credit_account_id.into_inner()),
            is_valid: Set(input.is_valid),
            description: Set(input.description.filter(|d| !d.trim().is_empty())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let stored = correspondence_pairs::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    correspondence_pairs::Column::DebitAccountId,
                    correspondence_pairs::Column::CreditAccountId,
                ])
                .update_columns([
                    correspondence_pairs::Column::IsValid,
                    correspondence_pairs::Column::Description,
                    correspondence_pairs::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await?;

        tracing::info!(
            debit_account_id = %stored.debit_account_id,
            credit_account_id = %stored.credit_account_id,
            is_valid = stored.is_valid,
            "Correspondence pair stored"
        );
        Ok(to_pair(stored))
    }

    /// Lists every stored rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_pairs(&self) -> RepositoryResult<Vec<CorrespondencePair>> {
        let models = correspondence_pairs::Entity::find()
            .order_by_asc(correspondence_pairs::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(to_pair).collect())
    }

    /// Checks a set of lines against the stored rules without posting anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn check_lines(
        &self,
        lines: &[JournalLineInput],
    ) -> RepositoryResult<Vec<CorrespondenceFinding>> {
        let rules = load_rules(&self.db, lines).await?;
        Ok(CorrespondenceRules::check(lines, |d, c| rules.get(&(d, c)).cloned()))
    }
}

/// Loads the stored rules for every pair the lines imply.
pub(crate) async fn load_rules<C>(
    conn: &C,
    lines: &[JournalLineInput],
) -> RepositoryResult<HashMap<(AccountId, AccountId), PairRule>>
where
    C: ConnectionTrait,
{
    let pairs = CorrespondenceRules::account_pairs(lines);
    if pairs.is_empty() {
        return Ok(HashMap::new());
    }

    let debit_ids: Vec<_> = pairs.iter().map(|(d, _)| d.into_inner()).collect();
    let models = correspondence_pairs::Entity::find()
        .filter(correspondence_pairs::Column::DebitAccountId.is_in(debit_ids))
        .all(conn)
        .await?;

    Ok(models
        .into_iter()
        .map(|m| {
            (
                (
                    AccountId::from_uuid(m.debit_account_id),
                    AccountId::from_uuid(m.credit_account_id),
                ),
                PairRule {
                    is_valid: m.is_valid,
                    description: m.description,
                },
            )
        })
        .collect())
}

fn to_pair(model: correspondence_pairs::Model) -> CorrespondencePair {
    CorrespondencePair {
        id: CorrespondencePairId::from_uuid(model.id),
        debit_account_id: AccountId::from_uuid(model.debit_account_id),
        credit_account_id: AccountId::from_uuid(model.credit_account_id),
        is_valid: model.is_valid,
        description: model.description,
    }
}
