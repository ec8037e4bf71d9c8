use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;

use crate::error::MarketError;

use super::migrations;

pub const HOME_ENV: &str = "TASKMARKET_HOME";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Resolve the data directory: `$TASKMARKET_HOME`, else `<cwd>/.taskmarket`.
pub fn data_dir() -> Result<PathBuf, MarketError> {
    if let Some(home) = env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    let cwd = env::current_dir().map_err(|e| MarketError::storage(e.to_string()))?;
    Ok(cwd.join(".taskmarket"))
}

/// Get the path to the marketplace database.
pub fn db_path() -> Result<PathBuf, MarketError> {
    Ok(data_dir()?.join("market.db"))
}

/// Get the config file path.
pub fn config_path() -> Result<PathBuf, MarketError> {
    Ok(data_dir()?.join("config.json"))
}

/// Open an existing database. Returns error if not initialized.
pub fn open_db(path: &Path, busy_timeout_ms: u64) -> Result<Connection, MarketError> {
    if !path.exists() {
        return Err(MarketError::not_initialized());
    }
    let conn = Connection::open(path)?;
    configure_connection(&conn, busy_timeout_ms)?;
    Ok(conn)
}

/// Create directories and database if needed, then run migrations.
pub fn init_db(path: &Path, busy_timeout_ms: u64) -> Result<Connection, MarketError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| MarketError::storage(e.to_string()))?;
    }
    let conn = Connection::open(path)?;
    configure_connection(&conn, busy_timeout_ms)?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

/// Fresh migrated in-memory database, used by tests and embedders.
pub fn open_in_memory() -> Result<Connection, MarketError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

fn configure_connection(conn: &Connection, busy_timeout_ms: u64) -> Result<(), MarketError> {
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run `f` inside `BEGIN IMMEDIATE`, committing on success and rolling back
/// on any error. The write lock is held from the first read, so a
/// read-modify-write in `f` cannot interleave with another writer.
pub fn immediate_transaction<T>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> Result<T, MarketError>,
) -> Result<T, MarketError> {
    conn.execute_batch("BEGIN IMMEDIATE")?;
    match f(conn) {
        Ok(value) => {
            if let Err(e) = conn.execute_batch("COMMIT") {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(e.into());
            }
            Ok(value)
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(e)
        }
    }
}

/// Current UTC timestamp in the format stored in every `*_at` column.
pub fn now() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

pub fn new_id() -> String {
    ulid::Ulid::new().to_string()
}
