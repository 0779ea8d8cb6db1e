use rollcall_shared::markup::{bold, escape};
use rollcall_store::StoreError;
use thiserror::Error;

/// What a failed lookup was searching for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Position(usize),
    Link(String),
    Name(String),
    /// The chat has no roster at all.
    Roster,
}

impl std::fmt::Display for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lookup::Position(n) => write!(f, "Participant with number {n} not found"),
            Lookup::Link(link) => write!(f, "Participant with link {link} not found"),
            Lookup::Name(name) => write!(f, "Participant with name \"{name}\" not found"),
            Lookup::Roster => f.write_str("No participants to delete"),
        }
    }
}

/// Failures of roster operations. Every variant maps to a chat reply.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("{0}")]
    NotFound(Lookup),

    /// The caller is already on the roster.
    #[error("You are already a participant")]
    AlreadyParticipant,

    /// Someone else is already on the roster under that reference or name.
    #[error("User is already in the list of participants")]
    AlreadyListed,

    #[error("Maximum chat participants: {0}")]
    RosterFull(usize),

    #[error("You are not a participant yet")]
    NotAParticipant,

    #[error("{0}")]
    InvalidArgument(&'static str),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl DirectoryError {
    /// Text sent back to the chat for this failure.
    pub fn reply(&self) -> String {
        match self {
            DirectoryError::RosterFull(max) => {
                format!("Maximum chat participants: {}", bold(&max.to_string()))
            }
            DirectoryError::Storage(_) => "Something went wrong, please try again later".into(),
            other => escape(&other.to_string()),
        }
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, DirectoryError::Storage(_))
    }
}

/// Convenience alias for roster operations.
pub type Result<T> = std::result::Result<T, DirectoryError>;
