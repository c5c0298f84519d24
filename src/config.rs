use serde::{Deserialize, Serialize};

// ============================================================================
// Store Configuration
// ============================================================================

pub const DATABASE_URL_ENV: &str = "ORDER_STORE_DATABASE_URL";
pub const MAX_CONNECTIONS_ENV: &str = "ORDER_STORE_MAX_CONNECTIONS";

const IN_MEMORY_URL: &str = "sqlite::memory:";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite connection string, e.g. `sqlite://orders.db` or `sqlite::memory:`
    pub database_url: String,
    /// Upper bound on pooled connections (forced to 1 for in-memory databases)
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

impl StoreConfig {
    /// Private in-memory database, gone when the pool is dropped
    pub fn in_memory() -> Self {
        Self {
            database_url: IN_MEMORY_URL.to_string(),
            max_connections: 1,
        }
    }

    /// File-backed database
    pub fn file(path: &str) -> Self {
        Self {
            database_url: format!("sqlite://{}", path),
            max_connections: 5,
        }
    }

    /// Read `ORDER_STORE_DATABASE_URL` and `ORDER_STORE_MAX_CONNECTIONS`,
    /// keeping defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(DATABASE_URL_ENV) {
            if url.trim().is_empty() {
                return Err(ConfigError::InvalidValue { name: DATABASE_URL_ENV, value: url });
            }
            config.database_url = url;
        }

        if let Some(raw) = lookup(MAX_CONNECTIONS_ENV) {
            config.max_connections = match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidValue { name: MAX_CONNECTIONS_ENV, value: raw }),
            };
        }

        Ok(config)
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
