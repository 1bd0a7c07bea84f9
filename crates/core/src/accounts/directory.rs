//! Validation rules for the chart of accounts.

use kassa_shared::types::AccountId;

use super::error::AccountError;
use super::types::{CreateAccountInput, CreateAnalyticalAccountInput};

/// Upper bound on parent hops; anything deeper is treated as corrupt data.
const MAX_DEPTH: usize = 64;

/// Minimal view of an account needed to walk the tree.
#[derive(Debug, Clone, Copy)]
pub struct ParentLink {
    /// The account's parent, if any.
    pub parent_id: Option<AccountId>,
    /// Whether the account is active.
    pub is_active: bool,
}

/// Pure validation for account directory changes.
pub struct AccountDirectory;

impl AccountDirectory {
    /// Validates an account code.
    ///
    /// Codes are one or more non-empty segments of ASCII letters and digits
    /// separated by `.` (e.g. `50`, `60.1`, `A.2.3`).
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidCode` if the code is malformed.
    pub fn validate_code(code: &str) -> Result<(), AccountError> {
        let valid = !code.is_empty()
            && code.len() <= 20
            && code
                .split('.')
                .all(|seg| !seg.is_empty() && seg.chars().all(|c| c.is_ascii_alphanumeric()));

        if valid {
            Ok(())
        } else {
            Err(AccountError::InvalidCode(code.to_string()))
        }
    }

    /// Validates a new account before it is persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the code or name is invalid, or the parent is
    /// missing or inactive.
    pub fn validate_new_account<L>(input: &CreateAccountInput, lookup: L) -> Result<(), AccountError>
    where
        L: Fn(AccountId) -> Option<ParentLink>,
    {
        Self::validate_code(&input.code)?;
        if input.name.trim().is_empty() {
            return Err(AccountError::EmptyName);
        }

        if let Some(parent_id) = input.parent_id {
            let parent = lookup(parent_id).ok_or(AccountError::NotFound(parent_id))?;
            if !parent.is_active {
                return Err(AccountError::ParentInactive(parent_id));
            }
        }

        Ok(())
    }

    /// Validates a new analytical account.
    ///
    /// # Errors
    ///
    /// Returns an error if the code or name is invalid or the owning account
    /// does not exist.
    pub fn validate_new_analytical<L>(
        input: &CreateAnalyticalAccountInput,
        lookup: L,
    ) -> Result<(), AccountError>
    where
        L: Fn(AccountId) -> Option<ParentLink>,
    {
        Self::validate_code(&input.code)?;
        if input.name.trim().is_empty() {
            return Err(AccountError::EmptyName);
        }
        lookup(input.parent_account_id).ok_or(AccountError::NotFound(input.parent_account_id))?;
        Ok(())
    }

    /// Validates that `account` may be placed under `new_parent`.
    ///
    /// Walks up from the proposed parent; reaching `account` means the move
    /// would create a cycle.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::CycleDetected` if the move would create a cycle,
    /// or `AccountError::NotFound` if an ancestor is missing.
    pub fn validate_parent<L>(
        account: AccountId,
        new_parent: AccountId,
        lookup: L,
    ) -> Result<(), AccountError>
    where
        L: Fn(AccountId) -> Option<ParentLink>,
    {
        let cycle = AccountError::CycleDetected {
            account,
            parent: new_parent,
        };

        let mut current = Some(new_parent);
        for _ in 0..MAX_DEPTH {
            let Some(id) = current else {
                return Ok(());
            };
            if id == account {
                return Err(cycle);
            }
            current = lookup(id).ok_or(AccountError::NotFound(id))?.parent_id;
        }

        Err(cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::types::AccountType;
    use std::collections::HashMap;

    fn tree(links: &[(AccountId, Option<AccountId>)]) -> HashMap<AccountId, ParentLink> {
        links
            .iter()
            .map(|(id, parent)| {
                (
                    *id,
                    ParentLink {
                        parent_id: *parent,
                        is_active: true,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_valid_codes() {
        for code in ["50", "60.1", "A.2.3", "1010"] {
            assert!(AccountDirectory::validate_code(code).is_ok(), "{code}");
        }
    }

    #[test]
    fn test_invalid_codes() {
        for code in ["", ".", "50.", ".50", "5 0", "50..1", "абв", "123456789012345678901"] {
            assert!(
                matches!(
                    AccountDirectory::validate_code(code),
                    Err(AccountError::InvalidCode(_))
                ),
                "{code:?}"
            );
        }
    }

    #[test]
    fn test_new_account_requires_existing_active_parent() {
        let parent = AccountId::new();
        let mut links = tree(&[(parent, None)]);
        let input = CreateAccountInput {
            code: "50.1".to_string(),
            name: "Cash desk".to_string(),
            account_type: AccountType::Asset,
            normal_side: None,
            parent_id: Some(parent),
        };

        assert!(AccountDirectory::validate_new_account(&input, |id| links.get(&id).copied()).is_ok());

        links.get_mut(&parent).unwrap().is_active = false;
        assert!(matches!(
            AccountDirectory::validate_new_account(&input, |id| links.get(&id).copied()),
            Err(AccountError::ParentInactive(_))
        ));

        assert!(matches!(
            AccountDirectory::validate_new_account(&input, |_| None),
            Err(AccountError::NotFound(_))
        ));
    }

    #[test]
    fn test_new_account_rejects_blank_name() {
        let input = CreateAccountInput {
            code: "50".to_string(),
            name: "   ".to_string(),
            account_type: AccountType::Asset,
            normal_side: None,
            parent_id: None,
        };
        assert!(matches!(
            AccountDirectory::validate_new_account(&input, |_| None),
            Err(AccountError::EmptyName)
        ));
    }

    #[test]
    fn test_validate_parent_accepts_unrelated_branch() {
        let (root, a, b) = (AccountId::new(), AccountId::new(), AccountId::new());
        let links = tree(&[(root, None), (a, Some(root)), (b, Some(root))]);

        assert!(AccountDirectory::validate_parent(a, b, |id| links.get(&id).copied()).is_ok());
    }

    #[test]
    fn test_validate_parent_rejects_self() {
        let a = AccountId::new();
        let links = tree(&[(a, None)]);
        assert!(matches!(
            AccountDirectory::validate_parent(a, a, |id| links.get(&id).copied()),
            Err(AccountError::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_validate_parent_rejects_descendant() {
        let (root, child, grandchild) = (AccountId::new(), AccountId::new(), AccountId::new());
        let links = tree(&[(root, None), (child, Some(root)), (grandchild, Some(child))]);

        assert!(matches!(
            AccountDirectory::validate_parent(root, grandchild, |id| links.get(&id).copied()),
            Err(AccountError::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_validate_parent_stops_on_corrupt_loop() {
        let (a, b, c) = (AccountId::new(), AccountId::new(), AccountId::new());
        // a and b already point at each other
        let links = tree(&[(a, Some(b)), (b, Some(a)), (c, None)]);

        assert!(AccountDirectory::validate_parent(c, a, |id| links.get(&id).copied()).is_err());
    }
}
