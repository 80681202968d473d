//! Connection pool configuration for the `PostgreSQL` adapter.

use super::repository::TaskPgPool;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use thiserror::Error;

/// Default maximum pool size when the environment does not override it.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Settings for building the task store's connection pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgStoreConfig {
    /// `PostgreSQL` connection string.
    pub database_url: String,
    /// Maximum pooled connections.
    pub max_connections: u32,
}

/// Errors raised while reading or applying pool configuration.
#[derive(Debug, Error)]
pub enum PgStoreConfigError {
    /// A required environment variable is absent or not unicode.
    #[error("environment variable {0} is missing or invalid")]
    MissingVariable(&'static str),

    /// An environment variable holds a value of the wrong shape.
    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },

    /// The pool could not be built against the configured database.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

impl PgStoreConfig {
    /// Creates a config with the default pool size.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Reads configuration from `DATABASE_URL` and the optional
    /// `DATABASE_MAX_CONNECTIONS`.
    ///
    /// # Errors
    ///
    /// Returns [`PgStoreConfigError`] when `DATABASE_URL` is unset or the
    /// pool-size override is not a positive integer.
    pub fn from_env() -> Result<Self, PgStoreConfigError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| PgStoreConfigError::MissingVariable("DATABASE_URL"))?;

        let max_connections = match std::env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => match raw.parse::<u32>() {
                Ok(parsed) if parsed > 0 => parsed,
                _ => {
                    return Err(PgStoreConfigError::InvalidValue {
                        name: "DATABASE_MAX_CONNECTIONS",
                        value: raw,
                    });
                }
            },
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            max_connections,
        })
    }

    /// Builds an r2d2 connection pool from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PgStoreConfigError::Pool`] when the pool cannot be
    /// established.
    pub fn build_pool(&self) -> Result<TaskPgPool, PgStoreConfigError> {
        let manager = ConnectionManager::<PgConnection>::new(&self.database_url);
        let pool = Pool::builder()
            .max_size(self.max_connections)
            .build(manager)?;
        Ok(pool)
    }
}
