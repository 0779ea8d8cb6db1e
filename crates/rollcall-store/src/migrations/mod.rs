//! Database migration runner.
//!
//! Migrations are executed in order on every [`Database::new`] / [`Database::open_at`]
//! call.  Each migration is guarded by a `user_version` pragma so it runs
//! exactly once.
//!
//! [`Database::new`]: crate::Database::new
//! [`Database::open_at`]: crate::Database::open_at

pub mod v001_initial;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Run all pending migrations against the open connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    tracing::info!(
        current_version = current,
        target_version = CURRENT_VERSION,
        "checking database migrations"
    );

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema v{current} is newer than supported v{CURRENT_VERSION}"
        )));
    }

    if current < 1 {
        tracing::info!("applying migration v001_initial");
        v001_initial::up(conn).map_err(|e| StoreError::Migration(e.to_string()))?;
        conn.pragma_update(None, "user_version", 1)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_set_user_version() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, CURRENT_VERSION);

        // Idempotent on a migrated database.
        run_migrations(&conn).unwrap();
    }

    #[test]
    fn newer_schema_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", CURRENT_VERSION + 1)
            .unwrap();
        assert!(matches!(
            run_migrations(&conn),
            Err(StoreError::Migration(_))
        ));
    }
}
