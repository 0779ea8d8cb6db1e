//! # rollcall-store
//!
//! Embedded roster storage for rollcall, backed by a single SQLite file.
//!
//! The store is organised as a top-level `chats` namespace holding one
//! partition per chat id; each partition maps a participant key to the
//! JSON-serialized [`Participant`]. The crate exposes a synchronous
//! [`Database`] handle that wraps a `rusqlite::Connection` and provides typed
//! CRUD helpers. Every mutation runs inside one transaction.

pub mod database;
pub mod migrations;
pub mod models;
pub mod participants;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
