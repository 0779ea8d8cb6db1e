//! Roster operations for a chat: adding, removing, listing and resetting
//! participants on top of the store.
//!
//! Decisions are made fresh on every call from the chat's current roster.
//! Positions are 1-based and re-derived from the oldest-first listing, so a
//! position seen in `/list` can shift if the roster changes before `/rm N`.

use chrono::Utc;
use rollcall_shared::{ChatId, Identity, Sender};
use rollcall_store::{Database, Participant, StoreError};
use tracing::{debug, info};

use crate::error::{DirectoryError, Lookup, Result};

/// Result of an add-self call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Added {
    pub participant: Participant,
    /// The caller replaced an earlier `@handle` reference to themselves.
    pub promoted: bool,
}

pub struct Directory {
    db: Database,
    max_participants: usize,
}

impl Directory {
    pub fn new(db: Database, max_participants: usize) -> Self {
        Self {
            db,
            max_participants,
        }
    }

    pub fn max_participants(&self) -> usize {
        self.max_participants
    }

    /// Hand back the store, e.g. to close it on shutdown.
    pub fn into_database(self) -> Database {
        self.db
    }

    // ------------------------------------------------------------------
    // Add
    // ------------------------------------------------------------------

    /// Add the sender as a channel participant.
    ///
    /// If someone previously added the sender by `@handle`, that entry is
    /// promoted in place and keeps its original join time.
    pub fn add_self(&mut self, chat_id: ChatId, sender: &Sender) -> Result<Added> {
        let identity = Identity::from_sender(sender);

        match self.db.get_participant(chat_id, &identity.unique_key()) {
            Ok(_) => return Err(DirectoryError::AlreadyParticipant),
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        if !sender.handle.is_empty() {
            let link = format!("@{}", sender.handle);
            if let Some(existing) = self.find_by_link(chat_id, &link)? {
                if !existing.is_unresolved() {
                    return Err(DirectoryError::AlreadyParticipant);
                }

                let participant = Participant::new(identity, chat_id, existing.created_at);
                self.db.replace_participant(&existing.key(), &participant)?;
                info!(%chat_id, handle = %sender.handle, "unresolved reference promoted");
                return Ok(Added {
                    participant,
                    promoted: true,
                });
            }
        }

        let participant = self.create(chat_id, identity)?;
        Ok(Added {
            participant,
            promoted: false,
        })
    }

    /// Add a not-yet-seen user by `@handle`.
    pub fn add_by_reference(&mut self, chat_id: ChatId, handle: &str) -> Result<Participant> {
        let link = format!("@{handle}");
        if self.find_by_link(chat_id, &link)?.is_some() {
            return Err(DirectoryError::AlreadyListed);
        }
        self.create(chat_id, Identity::unresolved(handle))
    }

    /// Add a guest under a free-text name.
    pub fn add_by_name(&mut self, chat_id: ChatId, name: &str) -> Result<Participant> {
        if self.find_by_name(chat_id, name)?.is_some() {
            return Err(DirectoryError::AlreadyListed);
        }
        self.create(chat_id, Identity::guest(name))
    }

    // ------------------------------------------------------------------
    // Remove
    // ------------------------------------------------------------------

    /// Remove the sender, whether they joined themselves or were added by
    /// someone else through their handle.
    pub fn remove_self(&mut self, chat_id: ChatId, sender: &Sender) -> Result<Participant> {
        let key = Identity::from_sender(sender).unique_key();

        let participant = match self.db.get_participant(chat_id, &key) {
            Ok(p) => Some(p),
            Err(StoreError::NotFound) if !sender.handle.is_empty() => {
                self.find_by_link(chat_id, &format!("@{}", sender.handle))?
            }
            Err(StoreError::NotFound) => None,
            Err(e) => return Err(e.into()),
        };

        let participant = participant.ok_or(DirectoryError::NotAParticipant)?;
        self.delete(&participant)?;
        Ok(participant)
    }

    /// Remove the participant at a 1-based position of the current roster.
    pub fn remove_by_position(&mut self, chat_id: ChatId, position: usize) -> Result<Participant> {
        let mut roster = self.roster(chat_id)?;
        let participant = match position.checked_sub(1) {
            Some(idx) if idx < roster.len() => roster.swap_remove(idx),
            _ => return Err(DirectoryError::NotFound(Lookup::Position(position))),
        };

        self.delete(&participant)?;
        Ok(participant)
    }

    /// Remove the participant whose link is exactly `link` (e.g. `@smith`).
    pub fn remove_by_reference(&mut self, chat_id: ChatId, link: &str) -> Result<Participant> {
        let participant = self
            .find_by_link(chat_id, link)?
            .ok_or_else(|| DirectoryError::NotFound(Lookup::Link(link.to_string())))?;

        self.delete(&participant)?;
        Ok(participant)
    }

    /// Remove the first participant whose display name is exactly `name`.
    pub fn remove_by_name(&mut self, chat_id: ChatId, name: &str) -> Result<Participant> {
        let participant = self
            .find_by_name(chat_id, name)?
            .ok_or_else(|| DirectoryError::NotFound(Lookup::Name(name.to_string())))?;

        self.delete(&participant)?;
        Ok(participant)
    }

    /// Drop the whole roster of a chat. Returns how many entries went away.
    pub fn reset(&mut self, chat_id: ChatId) -> Result<usize> {
        match self.db.delete_chat(chat_id) {
            Ok(removed) => Ok(removed),
            Err(StoreError::NotFound) => Err(DirectoryError::NotFound(Lookup::Roster)),
            Err(e) => Err(e.into()),
        }
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Current roster, oldest first.
    pub fn roster(&self, chat_id: ChatId) -> Result<Vec<Participant>> {
        Ok(self.db.list_participants(chat_id)?)
    }

    fn find_by_link(&self, chat_id: ChatId, link: &str) -> Result<Option<Participant>> {
        Ok(self
            .roster(chat_id)?
            .into_iter()
            .find(|p| p.link() == link))
    }

    fn find_by_name(&self, chat_id: ChatId, name: &str) -> Result<Option<Participant>> {
        Ok(self
            .roster(chat_id)?
            .into_iter()
            .find(|p| p.name() == name))
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn create(&mut self, chat_id: ChatId, identity: Identity) -> Result<Participant> {
        let count = self.db.count_participants(chat_id)?;
        if count >= self.max_participants {
            debug!(%chat_id, count, max = self.max_participants, "roster full");
            return Err(DirectoryError::RosterFull(self.max_participants));
        }

        let participant = Participant::new(identity, chat_id, Utc::now());
        self.db.put_participant(&participant)?;
        info!(
            %chat_id,
            key = %participant.key(),
            kind = %participant.identity.kind(),
            "participant added"
        );
        Ok(participant)
    }

    fn delete(&mut self, participant: &Participant) -> Result<()> {
        self.db
            .delete_participant(participant.chat_id, &participant.key())?;
        info!(
            chat_id = %participant.chat_id,
            key = %participant.key(),
            "participant removed"
        );
        Ok(())
    }
}
