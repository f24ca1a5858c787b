//! Database layer - Postgres person storage

pub mod persons;
pub mod query_builder;
mod sql;

pub use persons::PostgresPersonCollection;
pub use query_builder::{BindValue, PersonQuery};
pub use sql::validate_identifier;

use crate::config::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Build the connection pool. Connections are opened on first use.
pub fn create_pool(config: &DatabaseConfig) -> crate::Result<PgPool> {
    let options = PgConnectOptions::from_str(&config.url)?.options([(
        "statement_timeout",
        format!("{}s", config.statement_timeout_seconds),
    )]);

    Ok(PgPoolOptions::new()
        .min_connections(config.pool_min_size)
        .max_connections(config.pool_max_size)
        .acquire_timeout(Duration::from_secs(config.pool_timeout_seconds))
        .connect_lazy_with(options))
}
