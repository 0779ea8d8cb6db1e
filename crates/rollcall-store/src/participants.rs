//! CRUD operations for [`Participant`] records, partitioned per chat.

use chrono::Utc;
use rollcall_shared::ChatId;
use rusqlite::{params, OptionalExtension, Transaction};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Participant;

impl Database {
    // ------------------------------------------------------------------
    // Write
    // ------------------------------------------------------------------

    /// Store a participant in its chat partition, creating the partition if
    /// needed. An entry with the same key is overwritten.
    pub fn put_participant(&mut self, participant: &Participant) -> Result<()> {
        let tx = self.conn_mut().transaction()?;
        ensure_partition(&tx, participant.chat_id)?;
        upsert(&tx, participant)?;
        tx.commit()?;

        tracing::debug!(
            chat_id = %participant.chat_id,
            key = %participant.key(),
            "participant stored"
        );
        Ok(())
    }

    /// Atomically remove the entry under `old_key` and store `participant`.
    pub fn replace_participant(&mut self, old_key: &str, participant: &Participant) -> Result<()> {
        let tx = self.conn_mut().transaction()?;
        let partition = ensure_partition(&tx, participant.chat_id)?;
        tx.execute(
            "DELETE FROM participants WHERE chat_id = ?1 AND key = ?2",
            params![partition, old_key],
        )?;
        upsert(&tx, participant)?;
        tx.commit()?;

        tracing::debug!(
            chat_id = %participant.chat_id,
            old_key,
            key = %participant.key(),
            "participant replaced"
        );
        Ok(())
    }

    /// Delete one entry. Returns `true` if a row was deleted.
    ///
    /// Deleting from a chat without a partition is a no-op. Removing the last
    /// entry of a chat drops its partition.
    pub fn delete_participant(&mut self, chat_id: ChatId, key: &str) -> Result<bool> {
        let tx = self.conn_mut().transaction()?;
        let partition = ensure_partition(&tx, chat_id)?;
        let affected = tx.execute(
            "DELETE FROM participants WHERE chat_id = ?1 AND key = ?2",
            params![partition, key],
        )?;
        tx.execute(
            "DELETE FROM chats
             WHERE chat_id = ?1
               AND NOT EXISTS (SELECT 1 FROM participants WHERE chat_id = ?1)",
            params![partition],
        )?;
        tx.commit()?;

        tracing::debug!(%chat_id, key, deleted = affected > 0, "participant deleted");
        Ok(affected > 0)
    }

    /// Drop a whole chat partition. Returns the number of entries removed.
    ///
    /// Fails with [`StoreError::NotFound`] if the chat has no partition.
    pub fn delete_chat(&mut self, chat_id: ChatId) -> Result<usize> {
        let tx = self.conn_mut().transaction()?;
        let partition = chat_id.partition_name();
        let entries: i64 = tx.query_row(
            "SELECT COUNT(*) FROM participants WHERE chat_id = ?1",
            params![partition],
            |row| row.get(0),
        )?;
        let affected = tx.execute("DELETE FROM chats WHERE chat_id = ?1", params![partition])?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        tx.commit()?;

        tracing::info!(%chat_id, entries, "chat partition deleted");
        Ok(entries as usize)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single participant by key.
    pub fn get_participant(&self, chat_id: ChatId, key: &str) -> Result<Participant> {
        let value: Option<String> = self
            .conn()
            .query_row(
                "SELECT value FROM participants WHERE chat_id = ?1 AND key = ?2",
                params![chat_id.partition_name(), key],
                |row| row.get(0),
            )
            .optional()?;

        let value = value.ok_or(StoreError::NotFound)?;
        Ok(serde_json::from_str(&value)?)
    }

    /// List a chat's roster, oldest first. An absent partition yields an
    /// empty list.
    pub fn list_participants(&self, chat_id: ChatId) -> Result<Vec<Participant>> {
        let mut stmt = self.conn().prepare(
            "SELECT value FROM participants
             WHERE chat_id = ?1
             ORDER BY created_at ASC, rowid ASC",
        )?;

        let rows = stmt.query_map(params![chat_id.partition_name()], row_to_participant)?;

        let mut participants = Vec::new();
        for row in rows {
            participants.push(row?);
        }
        Ok(participants)
    }

    /// Every participant of every chat, in no particular order. Records that
    /// fail to decode are logged and skipped.
    pub fn list_all_participants(&self) -> Result<Vec<Participant>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT chat_id, key, value FROM participants")?;

        let rows = stmt.query_map([], |row| {
            let chat_id: String = row.get(0)?;
            let key: String = row.get(1)?;
            let value: String = row.get(2)?;
            Ok((chat_id, key, value))
        })?;

        let mut participants = Vec::new();
        for row in rows {
            let (chat_id, key, value) = row?;
            match serde_json::from_str(&value) {
                Ok(participant) => participants.push(participant),
                Err(e) => tracing::warn!(%chat_id, %key, error = %e, "skipping unreadable record"),
            }
        }
        Ok(participants)
    }

    /// Number of entries in a chat's roster.
    pub fn count_participants(&self, chat_id: ChatId) -> Result<usize> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM participants WHERE chat_id = ?1",
            params![chat_id.partition_name()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Whether the chat currently has a partition.
    #[cfg(test)]
    pub(crate) fn has_chat(&self, chat_id: ChatId) -> Result<bool> {
        let found: Option<i64> = self
            .conn()
            .query_row(
                "SELECT 1 FROM chats WHERE chat_id = ?1",
                params![chat_id.partition_name()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create the chat's partition row if it does not exist yet and return its
/// name.
fn ensure_partition(tx: &Transaction<'_>, chat_id: ChatId) -> Result<String> {
    let partition = chat_id.partition_name();
    tx.execute(
        "INSERT OR IGNORE INTO chats (chat_id, created_at) VALUES (?1, ?2)",
        params![partition, Utc::now().to_rfc3339()],
    )?;
    Ok(partition)
}

fn upsert(tx: &Transaction<'_>, participant: &Participant) -> Result<()> {
    let value = serde_json::to_string(participant)?;
    tx.execute(
        "INSERT INTO participants (chat_id, key, created_at, value)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(chat_id, key) DO UPDATE SET
             created_at = excluded.created_at,
             value = excluded.value",
        params![
            participant.chat_id.partition_name(),
            participant.key(),
            participant.created_at.timestamp_micros(),
            value,
        ],
    )?;
    Ok(())
}

/// Map a `rusqlite::Row` holding a JSON `value` column to a [`Participant`].
fn row_to_participant(row: &rusqlite::Row<'_>) -> rusqlite::Result<Participant> {
    let value: String = row.get(0)?;
    serde_json::from_str(&value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};
    use rollcall_shared::{Identity, Sender};
    use tempfile::TempDir;

    use super::*;

    fn test_db() -> (Database, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = Database::open_at(&dir.path().join("roster.db")).unwrap();
        (db, dir)
    }

    fn guest(chat: i64, name: &str, at: DateTime<Utc>) -> Participant {
        Participant::new(Identity::guest(name), ChatId(chat), at)
    }

    #[test]
    fn test_put_and_get_round_trip() {
        let (mut db, _dir) = test_db();
        let sender = Sender {
            external_id: "42".into(),
            handle: "smith".into(),
            first_name: "John".into(),
            last_name: "Smith".into(),
        };
        let participant = Participant::new(Identity::from_sender(&sender), ChatId(7), Utc::now());

        db.put_participant(&participant).unwrap();
        let fetched = db.get_participant(ChatId(7), &participant.key()).unwrap();
        assert_eq!(fetched, participant);

        let listed = db.list_participants(ChatId(7)).unwrap();
        assert_eq!(listed, vec![participant]);
    }

    #[test]
    fn test_get_missing_partition_or_key() {
        let (mut db, _dir) = test_db();
        assert!(db.get_participant(ChatId(1), "guest:x").unwrap_err().is_not_found());

        db.put_participant(&guest(1, "A", Utc::now())).unwrap();
        assert!(db.get_participant(ChatId(1), "guest:x").unwrap_err().is_not_found());
    }

    #[test]
    fn test_put_overwrites_same_key() {
        let (mut db, _dir) = test_db();
        let t0 = Utc::now();
        db.put_participant(&guest(1, "A", t0)).unwrap();
        db.put_participant(&guest(1, "A", t0 + Duration::seconds(5))).unwrap();

        let listed = db.list_participants(ChatId(1)).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].created_at, t0 + Duration::seconds(5));
    }

    #[test]
    fn test_list_is_ordered_by_creation() {
        let (mut db, _dir) = test_db();
        let t0 = Utc::now();
        db.put_participant(&guest(1, "C", t0 + Duration::seconds(2))).unwrap();
        db.put_participant(&guest(1, "A", t0)).unwrap();
        db.put_participant(&guest(1, "B", t0 + Duration::seconds(1))).unwrap();

        let names: Vec<String> = db
            .list_participants(ChatId(1))
            .unwrap()
            .iter()
            .map(Participant::name)
            .collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn test_equal_timestamps_keep_insertion_order() {
        let (mut db, _dir) = test_db();
        let t0 = Utc::now();
        for name in ["A", "B", "C"] {
            db.put_participant(&guest(1, name, t0)).unwrap();
        }

        let names: Vec<String> = db
            .list_participants(ChatId(1))
            .unwrap()
            .iter()
            .map(Participant::name)
            .collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn test_list_missing_partition_is_empty() {
        let (db, _dir) = test_db();
        assert!(db.list_participants(ChatId(99)).unwrap().is_empty());
        assert_eq!(db.count_participants(ChatId(99)).unwrap(), 0);
    }

    #[test]
    fn test_delete_without_partition_is_noop() {
        let (mut db, _dir) = test_db();
        assert!(!db.delete_participant(ChatId(5), "guest:nobody").unwrap());
        assert!(!db.has_chat(ChatId(5)).unwrap());
    }

    #[test]
    fn test_deleting_last_entry_drops_partition() {
        let (mut db, _dir) = test_db();
        let a = guest(1, "A", Utc::now());
        let b = guest(1, "B", Utc::now());
        db.put_participant(&a).unwrap();
        db.put_participant(&b).unwrap();

        assert!(db.delete_participant(ChatId(1), &a.key()).unwrap());
        assert!(db.has_chat(ChatId(1)).unwrap());
        assert_eq!(db.count_participants(ChatId(1)).unwrap(), 1);

        assert!(db.delete_participant(ChatId(1), &b.key()).unwrap());
        assert!(!db.has_chat(ChatId(1)).unwrap());
        assert!(db.delete_chat(ChatId(1)).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_chat_only_touches_target() {
        let (mut db, _dir) = test_db();
        db.put_participant(&guest(1, "A", Utc::now())).unwrap();
        db.put_participant(&guest(1, "B", Utc::now())).unwrap();
        db.put_participant(&guest(2, "C", Utc::now())).unwrap();

        assert_eq!(db.delete_chat(ChatId(1)).unwrap(), 2);
        assert!(db.list_participants(ChatId(1)).unwrap().is_empty());
        assert_eq!(db.count_participants(ChatId(2)).unwrap(), 1);
    }

    #[test]
    fn test_delete_chat_without_partition_is_not_found() {
        let (mut db, _dir) = test_db();
        assert!(db.delete_chat(ChatId(3)).unwrap_err().is_not_found());
    }

    #[test]
    fn test_replace_keeps_single_record() {
        let (mut db, _dir) = test_db();
        let t0 = Utc::now() - Duration::minutes(1);
        let unresolved = Participant::new(Identity::unresolved("jones"), ChatId(1), t0);
        db.put_participant(&unresolved).unwrap();

        let resolved = Participant::new(
            Identity::Channel {
                external_id: Some("9".into()),
                handle: "jones".into(),
                first_name: String::new(),
                last_name: String::new(),
            },
            ChatId(1),
            t0,
        );
        db.replace_participant(&unresolved.key(), &resolved).unwrap();

        let listed = db.list_participants(ChatId(1)).unwrap();
        assert_eq!(listed, vec![resolved]);
    }

    #[test]
    fn test_list_all_spans_chats() {
        let (mut db, _dir) = test_db();
        db.put_participant(&guest(1, "A", Utc::now())).unwrap();
        db.put_participant(&guest(2, "B", Utc::now())).unwrap();
        db.put_participant(&guest(3, "C", Utc::now())).unwrap();

        let mut names: Vec<String> = db
            .list_all_participants()
            .unwrap()
            .iter()
            .map(Participant::name)
            .collect();
        names.sort();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roster.db");
        let participant = guest(1, "Persisted", Utc::now());

        let mut db = Database::open_at(&path).unwrap();
        db.put_participant(&participant).unwrap();
        db.close().unwrap();

        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.list_participants(ChatId(1)).unwrap(), vec![participant]);
    }
}
