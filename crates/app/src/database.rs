//! Database connection management

use std::{path::Path, time::Duration};

use sqlx::{
    PgPool, Postgres, Transaction,
    migrate::{MigrateError, Migrator},
};
use thiserror::Error;

/// Directory holding the schema migrations.
pub const MIGRATIONS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/migrations");

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when no connection can be acquired.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns an error if the migrations cannot be read or applied.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    Migrator::new(Path::new(MIGRATIONS_DIR)).await?.run(pool).await
}

/// The store did not answer within the request deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("store did not respond within {} ms", .0.as_millis())]
pub struct StoreTimeout(pub Duration);

/// Run a store call under a request-scoped deadline.
///
/// The outer result is the deadline, the inner one the call's own outcome. Callers
/// treat an elapsed deadline as "not available", never as success.
///
/// # Errors
///
/// Returns [`StoreTimeout`] when the call does not complete in time.
pub async fn within<F>(timeout: Duration, future: F) -> Result<F::Output, StoreTimeout>
where
    F: Future,
{
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_elapsed| StoreTimeout(timeout))
}

#[cfg(test)]
mod tests {
    use std::future::pending;

    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn completed_calls_pass_through() -> TestResult {
        let value = within(Duration::from_millis(50), async { Ok::<_, sqlx::Error>(7) }).await??;

        assert_eq!(value, 7);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_calls_time_out() {
        let result = within(Duration::from_millis(50), pending::<()>()).await;

        assert_eq!(result, Err(StoreTimeout(Duration::from_millis(50))));
    }
}
