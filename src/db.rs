use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::history::HistoryError;

pub type DbPool = SqlitePool;

/// Open the connection pool and run migrations.
///
/// `database_url` is a sqlx SQLite URL, e.g. `sqlite://lift-log.db?mode=rwc`
/// or `sqlite::memory:`.
pub async fn initialize_db(database_url: &str) -> Result<DbPool, HistoryError> {
  info!(database_url, "initializing database");

  // In-memory databases are per connection, so a pool of one keeps them shared
  let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

  let pool = SqlitePoolOptions::new()
    .max_connections(max_connections)
    .connect(database_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("database initialized");

  Ok(pool)
}
