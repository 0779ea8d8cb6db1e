//! # rollcall-shared
//!
//! Types shared by the store and the bot server: the participant identity
//! model, chat-facing markup helpers and the inbound command event.

pub mod constants;
pub mod identity;
pub mod markup;
pub mod types;

pub use identity::{Identity, IdentityKind};
pub use types::{ChatId, CommandEvent, Sender};
