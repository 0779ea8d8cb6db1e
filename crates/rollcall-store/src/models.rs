//! Domain model structs persisted in the roster database.

use chrono::{DateTime, Utc};
use rollcall_shared::{ChatId, Identity};
use serde::{Deserialize, Serialize};

/// One entry of a chat roster.
///
/// Entries are keyed inside their chat partition by
/// [`Identity::unique_key`]; `created_at` fixes their position in the roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub identity: Identity,
    pub chat_id: ChatId,
    pub created_at: DateTime<Utc>,
}

impl Participant {
    pub fn new(identity: Identity, chat_id: ChatId, created_at: DateTime<Utc>) -> Self {
        Self {
            identity,
            chat_id,
            created_at,
        }
    }

    pub fn key(&self) -> String {
        self.identity.unique_key()
    }

    pub fn name(&self) -> String {
        self.identity.display_name()
    }

    pub fn link(&self) -> String {
        self.identity.display_link()
    }

    pub fn is_unresolved(&self) -> bool {
        self.identity.is_unresolved()
    }
}
