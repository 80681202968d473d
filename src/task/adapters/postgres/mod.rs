//! `PostgreSQL` adapters for task lifecycle persistence.

mod config;
mod models;
mod repository;
mod schema;

pub use config::{PgStoreConfig, PgStoreConfigError};
pub use repository::{PostgresStore, TaskPgPool};
