//! # rollcall-server
//!
//! Per-chat participant roster bot.
//!
//! Chat members manage a roster with text commands:
//! - `/add`, `/add @handle`, `/add Some Name` to join or add someone
//! - `/rm`, `/rm @handle`, `/rm 3`, `/rm Some Name` to leave or remove someone
//! - `/list` and `/reset` to show or clear the roster
//!
//! The [`router::Router`] classifies commands and dispatches them to the
//! [`directory::Directory`], which applies the roster rules on top of the
//! `rollcall-store` database. The [`telegram`] module connects the router to
//! the Telegram Bot API.

pub mod config;
pub mod directory;
pub mod error;
pub mod replies;
pub mod router;
pub mod server;
pub mod show;
pub mod telegram;
pub mod transport;
