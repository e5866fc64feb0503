//! SQLite persistence for cities and their temperature readings.
//!
//! The routines in [`cities`] and [`temperatures`] take a plain
//! `&mut SqliteConnection`, so the caller decides the transaction scope:
//! pass a pooled connection for reads, or `&mut tx` from `pool.begin()`
//! and commit when done.

use std::str::FromStr;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::error::Result;

pub mod cities;
pub mod temperatures;

/// Open a connection pool and bring the schema up to date.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new().max_connections(5);
    if database_url.contains(":memory:") {
        // An in-memory database lives and dies with its connection.
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options.connect_with(options).await?;

    migrate(&pool).await?;
    tracing::debug!(database_url, "database ready");

    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    connect("sqlite::memory:").await.expect("in-memory database")
}
