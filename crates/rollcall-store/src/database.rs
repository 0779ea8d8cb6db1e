//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations are run before any other operation. One process owns the file;
//! SQLite's WAL journal gives a single writer and concurrent readers.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::Connection;

use crate::error::{Result, StoreError};
use crate::migrations;

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the default roster database.
    ///
    /// The database file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/rollcall/rollcall.db`
    /// - macOS:   `~/Library/Application Support/com.rollcall.rollcall/rollcall.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\rollcall\rollcall\data\rollcall.db`
    pub fn new() -> Result<Self> {
        let db_path = default_path()?;
        Self::open_at(&db_path)
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        tracing::info!(path = %path.display(), "opening database");

        let conn = Connection::open(path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run_migrations(&conn)?;

        Ok(Self { conn })
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return a mutable reference to the underlying connection, needed to
    /// open write transactions.
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }

    /// Flush and release the database file.
    pub fn close(self) -> Result<()> {
        let path = self.path();
        self.conn.close().map_err(|(_, e)| StoreError::Sqlite(e))?;
        tracing::info!(path = ?path, "database closed");
        Ok(())
    }
}

/// Location of the database when no explicit path is configured.
pub fn default_path() -> Result<PathBuf> {
    let project_dirs =
        ProjectDirs::from("com", "rollcall", "rollcall").ok_or(StoreError::NoDataDir)?;
    Ok(project_dirs.data_dir().join("rollcall.db"))
}
