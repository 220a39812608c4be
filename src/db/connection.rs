use std::env;
use std::fs;
use std::path::PathBuf;

use rusqlite::Connection;

use crate::error::FocusError;

use super::{migrations, SqliteStore};

pub const WORKSPACE_DIR: &str = ".taskfocus";
pub const DIR_ENV: &str = "TASKFOCUS_DIR";

/// Locate the workspace directory: `$TASKFOCUS_DIR` if set, otherwise the
/// nearest `.taskfocus/` walking up from the current directory.
pub fn find_workspace() -> Result<PathBuf, FocusError> {
    if let Some(dir) = env::var_os(DIR_ENV).filter(|v| !v.is_empty()) {
        let dir = PathBuf::from(dir);
        return if dir.is_dir() {
            Ok(dir)
        } else {
            Err(FocusError::not_initialized())
        };
    }
    let mut dir = env::current_dir()?;
    loop {
        let candidate = dir.join(WORKSPACE_DIR);
        if candidate.is_dir() {
            return Ok(candidate);
        }
        if !dir.pop() {
            return Err(FocusError::not_initialized());
        }
    }
}

/// Where `init` creates the workspace.
pub fn workspace_for_init() -> Result<PathBuf, FocusError> {
    match env::var_os(DIR_ENV).filter(|v| !v.is_empty()) {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Ok(env::current_dir()?.join(WORKSPACE_DIR)),
    }
}

/// Get the path to the taskfocus database.
pub fn db_path() -> Result<PathBuf, FocusError> {
    Ok(find_workspace()?.join("taskfocus.db"))
}

/// Get the config file path.
pub fn config_path() -> Result<PathBuf, FocusError> {
    Ok(find_workspace()?.join("config.json"))
}

/// Open the store. Returns error if not initialized.
pub fn open_store() -> Result<SqliteStore, FocusError> {
    let path = db_path()?;
    if !path.exists() {
        return Err(FocusError::not_initialized());
    }
    let conn = Connection::open(&path)?;
    configure_connection(&conn)?;
    migrations::run_migrations(&conn)?;
    Ok(SqliteStore::new(conn))
}

/// Initialize the workspace: create the directory, database, and run migrations.
pub fn init_db() -> Result<PathBuf, FocusError> {
    let dir = workspace_for_init()?;
    fs::create_dir_all(&dir)?;
    let path = dir.join("taskfocus.db");
    let conn = Connection::open(&path)?;
    configure_connection(&conn)?;
    migrations::run_migrations(&conn)?;
    tracing::info!(path = %path.display(), "workspace initialized");
    Ok(path)
}

pub(crate) fn configure_connection(conn: &Connection) -> Result<(), FocusError> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA busy_timeout=5000;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}
