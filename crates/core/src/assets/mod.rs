//! Register of factory property.
//!
//! Buildings, equipment and vehicles are tracked at their current value.
//! The register sits beside the cash ledger: recording or revaluing an asset
//! never moves cash or posts journal lines.

pub mod error;
pub mod types;

pub use error::AssetError;
pub use types::{AssetType, CreateAssetInput, FactoryAsset, total_value};
