//! # Database State
//!
//! Owns the host's single `Database` and knows where its file lives.
//!
//! The `Database` holds a `SqlitePool`, which is already thread-safe, so
//! commands share it by reference without extra locking.

use directories::ProjectDirs;
use lubri_db::{Database, DbConfig};
use std::path::PathBuf;
use tracing::info;

use crate::error::HostError;

/// Database file name inside the data directory.
const DB_FILE: &str = "oil_inventory.db";

/// Wrapper around `Database` for the command layer.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Opens (and migrates) the database at `path`.
    pub async fn open(path: PathBuf) -> Result<Self, HostError> {
        info!(path = %path.display(), "Opening database");
        let db = Database::new(DbConfig::new(path)).await?;
        Ok(DbState::new(db))
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }

    pub async fn close(&self) {
        self.db.close().await;
    }
}

/// Determines the database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.lubri.lubri-pos/oil_inventory.db`
/// - **Windows**: `%APPDATA%\lubri\lubri-pos\data\oil_inventory.db`
/// - **Linux**: `~/.local/share/lubri-pos/oil_inventory.db`
///
/// ## Development Override
/// Set `LUBRI_DB_PATH` to use a custom path.
pub fn database_path() -> Result<PathBuf, HostError> {
    if let Ok(path) = std::env::var("LUBRI_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    let proj_dirs = ProjectDirs::from("com", "lubri", "lubri-pos").ok_or(HostError::NoDataDir)?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join(DB_FILE))
}
