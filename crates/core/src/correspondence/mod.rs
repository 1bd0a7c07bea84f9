//! Account correspondence rules.
//!
//! An allow-list of (debit account, credit account) pairs consulted before a
//! manually authored entry is posted.

pub mod rules;

pub use rules::{CorrespondenceFinding, CorrespondencePair, CorrespondenceRules, FindingKind, PairRule};
