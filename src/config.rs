use std::time::Duration;

use anyhow::{bail, Context, Result};

const MIN_HASH_COST: u32 = 4;
const MAX_HASH_COST: u32 = 31;

/// Connection and hashing settings for the account store.
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub password_hash_cost: u32,
}

impl PersistenceConfig {
    /// Settings for `database_url` with every other value at its default.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
            password_hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn from_env() -> Result<Self> {
        let database_url = env_string("ACCOUNTS_DATABASE_URL", "sqlite::memory:");

        let max_connections = env_string("ACCOUNTS_DB_MAX_CONNECTIONS", "5")
            .parse::<u32>()
            .context("ACCOUNTS_DB_MAX_CONNECTIONS must be u32")?;
        if max_connections == 0 {
            bail!("ACCOUNTS_DB_MAX_CONNECTIONS must be at least 1");
        }

        let acquire_timeout = env_string("ACCOUNTS_DB_ACQUIRE_TIMEOUT_SECS", "5")
            .parse::<u64>()
            .map(Duration::from_secs)
            .context("ACCOUNTS_DB_ACQUIRE_TIMEOUT_SECS must be u64")?;

        let password_hash_cost =
            env_string("ACCOUNTS_PASSWORD_HASH_COST", &bcrypt::DEFAULT_COST.to_string())
                .parse::<u32>()
                .context("ACCOUNTS_PASSWORD_HASH_COST must be u32")?;
        if !(MIN_HASH_COST..=MAX_HASH_COST).contains(&password_hash_cost) {
            bail!(
                "ACCOUNTS_PASSWORD_HASH_COST must be between {} and {}",
                MIN_HASH_COST,
                MAX_HASH_COST
            );
        }

        Ok(Self {
            database_url,
            max_connections,
            acquire_timeout,
            password_hash_cost,
        })
    }

    /// Whether the URL points at a private in-memory SQLite database.
    ///
    /// Every connection to such a URL sees its own empty database, so the
    /// pool must never hold more than one.
    pub fn is_in_memory(&self) -> bool {
        self.database_url.starts_with("sqlite:") && self.database_url.contains(":memory:")
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
