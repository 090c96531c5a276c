use crate::error::SessionError;
use configuration::Config;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Connection, SqlitePool};
use std::time::Duration;

/// Engine identities served by the SQLite driver.
pub const SQLITE_ENGINE_IDENTITIES: &[&str] = &["sqlite", "sqlite3"];

/// How long `acquire` waits for a pooled connection.
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Fails unless `identity` names a driver this crate can open.
pub fn check_engine_identity(identity: &str) -> Result<(), SessionError> {
    if SQLITE_ENGINE_IDENTITIES.contains(&identity) {
        Ok(())
    } else {
        Err(SessionError::UnsupportedEngineIdentity(identity.to_string()))
    }
}

/// Opens a connection pool on the local database file.
///
/// The file is created if missing and switched to WAL journaling, which
/// replication relies on.
pub async fn open_database(config: &Config) -> Result<SqlitePool, SessionError> {
    check_engine_identity(config.engine_identity())?;

    let options = SqliteConnectOptions::new()
        .filename(config.path())
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections())
        .acquire_timeout(DEFAULT_ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await
        .map_err(|source| SessionError::DatabaseOpen {
            path: config.path().to_path_buf(),
            source,
        })?;

    tracing::info!(path = %config.path().display(), "database opened");
    Ok(pool)
}

/// Round-trips a pooled connection to verify the database is reachable.
pub async fn ping(pool: &SqlitePool) -> Result<(), SessionError> {
    let mut conn = pool.acquire().await.map_err(SessionError::Ping)?;
    conn.ping().await.map_err(SessionError::Ping)
}
