use std::time::Duration;

use anyhow::{Context, Result};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::query_dsl::methods::ExecuteDsl;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;
use tracing::{debug, warn};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// How many times a write is retried when SQLite reports the database as busy
const MAX_WRITE_ATTEMPTS: u32 = 5;

/// Base delay between write attempts; doubled after each failure
const RETRY_BASE_DELAY: Duration = Duration::from_millis(20);

/// Per-connection setup applied by the pool
///
/// SQLite keeps `foreign_keys` and `busy_timeout` per connection, so every
/// connection handed out by the pool has to set them.
#[derive(Debug, Clone, Copy)]
struct ConnectionOptions {
    busy_timeout_ms: u32,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout_ms
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Creates the connection pool for the given SQLite database URL
///
/// ### Errors
///
/// Returns an error if the pool cannot open its initial connections.
pub fn init_pool(database_url: &str) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .connection_customizer(Box::new(ConnectionOptions { busy_timeout_ms: 5_000 }))
        .build(manager)
        .with_context(|| format!("Failed to create database pool for {}", database_url))
}

/// Returns true when the error means another connection holds the write lock
fn is_busy(err: &DieselError) -> bool {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::Unknown, info) => {
            let message = info.message();
            message.contains("database is locked") || message.contains("database table is locked")
        }
        _ => false,
    }
}

/// Executes a write statement, retrying with backoff while SQLite is busy
pub trait ExecuteWithRetry: Sized {
    async fn execute_with_retry(self, conn: &mut SqliteConnection) -> QueryResult<usize>;
}

impl<Q> ExecuteWithRetry for Q
where
    Q: ExecuteDsl<SqliteConnection> + Clone + Send,
{
    async fn execute_with_retry(self, conn: &mut SqliteConnection) -> QueryResult<usize> {
        let mut delay = RETRY_BASE_DELAY;
        let mut attempt = 1;
        loop {
            match ExecuteDsl::execute(self.clone(), conn) {
                Err(err) if is_busy(&err) && attempt < MAX_WRITE_ATTEMPTS => {
                    warn!("Database busy (attempt {}), retrying in {:?}", attempt, delay);
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Ok(rows) => {
                    debug!("Write affected {} rows", rows);
                    return Ok(rows);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Returns true when the error is a UNIQUE constraint violation
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<DieselError>(),
        Some(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
    )
}
