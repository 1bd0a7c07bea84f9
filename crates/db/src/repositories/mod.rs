//! Repository abstractions for data access.
//!
//! Repositories validate through `kassa-core` and persist through `SeaORM`.
//! Operations that move cash or post entries run in one transaction and are
//! retried on serialization failures.

pub mod account;
pub mod asset;
pub mod cash;
pub mod category;
pub mod correspondence;
pub mod debt;
pub mod event;
pub mod journal;
pub mod period;
pub mod report;
pub mod template;

pub use account::AccountRepository;
pub use asset::AssetRepository;
pub use cash::CashLedger;
pub use category::CategoryRepository;
pub use correspondence::{CorrespondenceRepository, UpsertPairInput};
pub use debt::{DebtFilter, DebtRepository, RecordedPayment};
pub use event::{EventFilter, EventRepository, RecordedEvent};
pub use journal::{EntryFilter, JournalRepository, PostedEntry};
pub use period::PeriodRepository;
pub use report::ReportRepository;
pub use template::{ExpandInput, TemplateRepository};
