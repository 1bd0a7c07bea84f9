//! Shared types, errors, and configuration for Kassa.
//!
//! This crate provides common types used across all other crates:
//! - Money types with decimal precision and the cent rounding rule
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, CorrespondencePolicy, LedgerConfig, RetryConfig};
pub use error::{AppError, AppResult};
