//! Database pool setup and query conventions
//!
//! Domain functions use sqlx's generic Executor trait, which allows them to
//! accept both `&PgPool` and `&mut PgConnection` (transactions):
//!
//! ```ignore
//! use sqlx::{Executor, Postgres};
//!
//! pub async fn my_query<'e, E>(executor: E, id: Uuid) -> Result<MyType, sqlx::Error>
//! where
//!     E: Executor<'e, Database = Postgres>,
//! {
//!     sqlx::query_as("SELECT * FROM my_table WHERE id = $1")
//!         .bind(id)
//!         .fetch_one(executor)
//!         .await
//! }
//! ```
//!
//! Every write is a single statement; routes own any transaction boundary.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use crate::config::DatabaseConfig;

/// Connect the shared pool
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        "database pool connected"
    );
    Ok(pool)
}
