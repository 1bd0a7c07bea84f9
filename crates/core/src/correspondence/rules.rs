//! Correspondence checks for manually authored entries.

use std::collections::BTreeSet;

use kassa_shared::CorrespondencePolicy;
use kassa_shared::types::{AccountId, CorrespondencePairId};
use serde::{Deserialize, Serialize};

use crate::ledger::error::LedgerError;
use crate::ledger::types::{EntrySide, JournalLineInput};

/// A stored correspondence rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrespondencePair {
    /// Unique identifier.
    pub id: CorrespondencePairId,
    /// Debited account.
    pub debit_account_id: AccountId,
    /// Credited account.
    pub credit_account_id: AccountId,
    /// Whether the pair is an allowed correspondence.
    pub is_valid: bool,
    /// Optional warning or explanation shown with the pair.
    pub description: Option<String>,
}

/// The part of a stored pair that the check needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairRule {
    /// Whether the pair is allowed.
    pub is_valid: bool,
    /// Optional warning text.
    pub description: Option<String>,
}

/// Classification of a checked pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingKind {
    /// The pair is listed with `is_valid = false`.
    Invalid,
    /// The pair is not listed at all.
    Unlisted,
    /// The pair is allowed but carries a warning.
    Advisory,
}

impl FindingKind {
    /// Returns true if the finding blocks posting under the reject policy.
    #[must_use]
    pub const fn is_blocking(self) -> bool {
        matches!(self, Self::Invalid | Self::Unlisted)
    }
}

/// One observation about an account pair used by an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrespondenceFinding {
    /// Debited account.
    pub debit_account_id: AccountId,
    /// Credited account.
    pub credit_account_id: AccountId,
    /// What was found.
    pub kind: FindingKind,
    /// Warning text from the rule, if any.
    pub message: Option<String>,
}

impl CorrespondenceFinding {
    fn reason(&self) -> String {
        let base = match self.kind {
            FindingKind::Invalid => "pair is marked invalid",
            FindingKind::Unlisted => "pair is not in the correspondence table",
            FindingKind::Advisory => "pair carries a warning",
        };
        match &self.message {
            Some(msg) => format!("{base}: {msg}"),
            None => base.to_string(),
        }
    }
}

/// Pure correspondence checks.
pub struct CorrespondenceRules;

impl CorrespondenceRules {
    /// Returns every (debit account, credit account) pair the entry implies.
    ///
    /// Pairs are the cross product of debited and credited accounts, deduplicated
    /// and sorted. Lines with an invalid shape are ignored.
    #[must_use]
    pub fn account_pairs(lines: &[JournalLineInput]) -> Vec<(AccountId, AccountId)> {
        let mut debits = BTreeSet::new();
        let mut credits = BTreeSet::new();
        for line in lines {
            match line.side() {
                Some(EntrySide::Debit) => {
                    debits.insert(line.account_id);
                }
                Some(EntrySide::Credit) => {
                    credits.insert(line.account_id);
                }
                None => {}
            }
        }

        debits
            .iter()
            .flat_map(|d| credits.iter().map(move |c| (*d, *c)))
            .collect()
    }

    /// Checks every pair of the entry against the rules returned by `lookup`.
    ///
    /// Valid pairs without a warning produce no finding.
    pub fn check<L>(lines: &[JournalLineInput], lookup: L) -> Vec<CorrespondenceFinding>
    where
        L: Fn(AccountId, AccountId) -> Option<PairRule>,
    {
        Self::account_pairs(lines)
            .into_iter()
            .filter_map(|(debit, credit)| {
                let (kind, message) = match lookup(debit, credit) {
                    None => (FindingKind::Unlisted, None),
                    Some(rule) if !rule.is_valid => (FindingKind::Invalid, rule.description),
                    Some(PairRule {
                        description: Some(text),
                        ..
                    }) if !text.trim().is_empty() => (FindingKind::Advisory, Some(text)),
                    Some(_) => return None,
                };
                Some(CorrespondenceFinding {
                    debit_account_id: debit,
                    credit_account_id: credit,
                    kind,
                    message,
                })
            })
            .collect()
    }

    /// Applies the policy to a set of findings.
    ///
    /// Under `Warn` nothing blocks. Under `Reject` the first invalid or
    /// unlisted pair blocks; advisories never do.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::CorrespondenceRejected` for a blocking finding.
    pub fn enforce(
        policy: CorrespondencePolicy,
        findings: &[CorrespondenceFinding],
    ) -> Result<(), LedgerError> {
        if policy == CorrespondencePolicy::Warn {
            return Ok(());
        }

        match findings.iter().find(|f| f.kind.is_blocking()) {
            Some(blocking) => Err(LedgerError::CorrespondenceRejected {
                debit_account: blocking.debit_account_id,
                credit_account: blocking.credit_account_id,
                reason: blocking.reason(),
            }),
            None => Ok(()),
        }
    }
}
