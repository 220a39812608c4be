pub mod commands;
pub mod config;
pub mod focus;
pub mod init;
pub mod task;

pub use commands::*;

use crate::config::Config;
use crate::db::{connection, SqliteStore};
use crate::error::FocusError;
use crate::lifecycle::TaskManager;

/// Open the workspace store with its saved configuration.
pub fn open_manager() -> Result<TaskManager<SqliteStore>, FocusError> {
    let store = connection::open_store()?;
    let config = Config::load(&connection::config_path()?)?;
    Ok(TaskManager::new(store, config))
}
