//! Handles to the collaborators the site is built on.
//!
//! Everything that persists data or checks credentials goes through the
//! [`store::DocumentStore`] and [`auth::AuthService`] traits. The SQLite
//! adapters in this module are the only code that knows about tables; the
//! rest of the crate sees named collections of JSON documents and opaque
//! admin sessions.

use diesel::{
    SqliteConnection,
    r2d2::{ConnectionManager, Pool, PoolError},
};
use diesel_migrations::MigrationHarness;
use thiserror::Error;

use crate::MIGRATIONS;

pub mod auth;
pub mod store;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not obtain a database connection: {0}")]
    Pool(#[from] PoolError),
    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("stored document is not a JSON object: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("could not run migrations: {0}")]
    Migration(String),
}

/// Opens the connection pool and brings the schema up to date.
///
/// `:memory:` databases only live as long as their connection, so the pool is
/// pinned to a single connection in that case.
pub fn connect(database_url: &str) -> Result<DbPool, StoreError> {
    tracing::info!("opening database at {database_url}");

    let pool: DbPool = Pool::builder()
        .max_size(if database_url == ":memory:" { 1 } else { 10 })
        .build(ConnectionManager::<SqliteConnection>::new(database_url))?;

    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| StoreError::Migration(e.to_string()))?;
    tracing::info!("applied {} pending migration(s)", applied.len());

    Ok(pool)
}
