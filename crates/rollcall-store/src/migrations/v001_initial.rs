//! v001 -- Initial schema creation.
//!
//! Creates the `chats` namespace table and the `participants` table holding
//! one partition of entries per chat.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Chats (one row per chat partition)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS chats (
    chat_id    TEXT PRIMARY KEY NOT NULL,     -- decimal chat id
    created_at TEXT NOT NULL                  -- RFC-3339
);

-- ----------------------------------------------------------------
-- Participants (entries of a chat partition)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS participants (
    chat_id    TEXT NOT NULL,                 -- FK -> chats(chat_id)
    key        TEXT NOT NULL,                 -- "<kind>:<id>"
    created_at INTEGER NOT NULL,              -- unix microseconds, for ordering
    value      TEXT NOT NULL,                 -- JSON participant record

    PRIMARY KEY (chat_id, key),
    FOREIGN KEY (chat_id) REFERENCES chats(chat_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_participants_chat_created
    ON participants(chat_id, created_at ASC);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
