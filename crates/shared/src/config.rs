//! Application configuration management.

use serde::Deserialize;

use crate::types::Currency;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger behaviour.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Ledger engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerConfig {
    /// Currency of the operating cash account.
    #[serde(default)]
    pub currency: Currency,
    /// What to do with a manual entry whose account pairs are not allowed.
    #[serde(default)]
    pub correspondence_policy: CorrespondencePolicy,
    /// Retry budget for serialization conflicts.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Policy applied to correspondence findings on manually authored entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrespondencePolicy {
    /// Log findings and post anyway.
    #[default]
    Warn,
    /// Refuse to post an entry with an invalid or unlisted pair.
    Reject,
}

/// Retry budget for transactions aborted by the database.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for each further attempt.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    10
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("KASSA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_with_defaults() {
        temp_env::with_vars(
            [
                ("KASSA__DATABASE__URL", Some("postgres://localhost/kassa")),
                ("RUN_MODE", Some("test-nonexistent")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/kassa");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.database.min_connections, 1);
                assert_eq!(config.ledger.currency, Currency::Kgs);
                assert_eq!(
                    config.ledger.correspondence_policy,
                    CorrespondencePolicy::Warn
                );
                assert_eq!(config.ledger.retry.max_attempts, 5);
                assert_eq!(config.ledger.retry.base_delay_ms, 10);
            },
        );
    }

    #[test]
    fn test_reject_policy_from_environment() {
        temp_env::with_vars(
            [
                ("KASSA__DATABASE__URL", Some("postgres://localhost/kassa")),
                ("KASSA__LEDGER__CORRESPONDENCE_POLICY", Some("reject")),
                ("KASSA__LEDGER__RETRY__MAX_ATTEMPTS", Some("3")),
                ("RUN_MODE", Some("test-nonexistent")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(
                    config.ledger.correspondence_policy,
                    CorrespondencePolicy::Reject
                );
                assert_eq!(config.ledger.retry.max_attempts, 3);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("KASSA__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test-nonexistent")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
