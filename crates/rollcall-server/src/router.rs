//! Command routing.
//!
//! Inbound commands are matched against an ordered table of
//! `(verb, argument pattern, action)` routes. The first route whose verb
//! matches and whose pattern accepts the trimmed argument wins; a route
//! without a pattern only accepts an empty argument.

use regex::Regex;
use rollcall_shared::constants::MAX_ARGUMENT_LENGTH;
use rollcall_shared::CommandEvent;
use tracing::{error, info, warn};

use crate::directory::Directory;
use crate::error::{DirectoryError, Result};
use crate::replies;

/// Operation a route dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddSelf,
    AddByReference,
    AddByNumber,
    AddByName,
    RemoveSelf,
    RemoveByReference,
    RemoveByPosition,
    RemoveByName,
    List,
    Reset,
    Help,
}

const REFERENCE_PATTERN: &str = r"^@(\S+)$";
const NUMBER_PATTERN: &str = r"^[0-9]+$";
const TEXT_PATTERN: &str = r"^.+$";

/// Route table in match order. Within a verb the reference pattern must come
/// before the free-text one.
const ROUTES: &[(&str, Option<&str>, Action)] = &[
    ("add", None, Action::AddSelf),
    ("add", Some(REFERENCE_PATTERN), Action::AddByReference),
    ("add", Some(NUMBER_PATTERN), Action::AddByNumber),
    ("add", Some(TEXT_PATTERN), Action::AddByName),
    ("rm", None, Action::RemoveSelf),
    ("rm", Some(REFERENCE_PATTERN), Action::RemoveByReference),
    ("rm", Some(NUMBER_PATTERN), Action::RemoveByPosition),
    ("rm", Some(TEXT_PATTERN), Action::RemoveByName),
    ("list", None, Action::List),
    ("reset", None, Action::Reset),
    ("start", None, Action::Help),
    ("help", None, Action::Help),
];

struct Route {
    verb: &'static str,
    pattern: Option<Regex>,
    action: Action,
}

impl Route {
    fn matches(&self, verb: &str, argument: &str) -> bool {
        if self.verb != verb {
            return false;
        }
        match &self.pattern {
            Some(pattern) => pattern.is_match(argument),
            None => argument.is_empty(),
        }
    }
}

/// A classified command: the chosen action plus the first capture group of
/// its pattern, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched {
    pub action: Action,
    pub capture: Option<String>,
}

pub struct Router {
    routes: Vec<Route>,
    directory: Directory,
    version: String,
}

impl Router {
    /// Build the router, compiling every route pattern once.
    pub fn new(directory: Directory, version: impl Into<String>) -> Self {
        let routes = ROUTES
            .iter()
            .map(|&(verb, pattern, action)| Route {
                verb,
                pattern: pattern.map(|p| Regex::new(p).expect("route pattern is valid")),
                action,
            })
            .collect();

        Self {
            routes,
            directory,
            version: version.into(),
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Hand back the directory, e.g. to close its store on shutdown.
    pub fn into_directory(self) -> Directory {
        self.directory
    }

    /// Find the first route accepting `verb` with the already trimmed
    /// `argument`.
    pub fn classify(&self, verb: &str, argument: &str) -> Option<Matched> {
        let route = self.routes.iter().find(|r| r.matches(verb, argument))?;
        let capture = route
            .pattern
            .as_ref()
            .and_then(|p| p.captures(argument))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());

        Some(Matched {
            action: route.action,
            capture,
        })
    }

    /// Handle one inbound command and produce the reply text.
    pub fn handle(&mut self, event: &CommandEvent) -> String {
        let argument = event.argument.trim();

        if argument.chars().count() > MAX_ARGUMENT_LENGTH {
            warn!(chat_id = %event.chat_id, verb = %event.verb, "argument too long");
            return replies::PARAMETER_TOO_LONG.to_string();
        }

        let Some(matched) = self.classify(&event.verb, argument) else {
            return replies::WRONG_COMMAND.to_string();
        };

        info!(
            chat_id = %event.chat_id,
            sender = %event.sender.handle,
            verb = %event.verb,
            argument,
            action = ?matched.action,
            "command"
        );

        match self.dispatch(event, argument, &matched) {
            Ok(text) => text,
            Err(e) => {
                if e.is_storage() {
                    error!(chat_id = %event.chat_id, error = %e, "command failed");
                }
                e.reply()
            }
        }
    }

    fn dispatch(&mut self, event: &CommandEvent, argument: &str, matched: &Matched) -> Result<String> {
        let chat_id = event.chat_id;
        let directory = &mut self.directory;

        let text = match matched.action {
            Action::AddSelf => {
                let added = directory.add_self(chat_id, &event.sender)?;
                replies::added(&added.participant, &directory.roster(chat_id)?)
            }
            Action::AddByReference => {
                let handle = matched.capture.as_deref().unwrap_or(&argument[1..]);
                let participant = directory.add_by_reference(chat_id, handle)?;
                replies::added(&participant, &directory.roster(chat_id)?)
            }
            Action::AddByNumber => {
                return Err(DirectoryError::InvalidArgument(replies::NUMERIC_NAME));
            }
            Action::AddByName => {
                let participant = directory.add_by_name(chat_id, argument)?;
                replies::added(&participant, &directory.roster(chat_id)?)
            }
            Action::RemoveSelf => {
                let participant = directory.remove_self(chat_id, &event.sender)?;
                replies::removed(&participant, &directory.roster(chat_id)?)
            }
            Action::RemoveByReference => {
                let participant = directory.remove_by_reference(chat_id, argument)?;
                replies::removed(&participant, &directory.roster(chat_id)?)
            }
            Action::RemoveByPosition => {
                let position: usize = argument
                    .parse()
                    .map_err(|_| DirectoryError::InvalidArgument(replies::WRONG_PARAMETER))?;
                let participant = directory.remove_by_position(chat_id, position)?;
                replies::removed(&participant, &directory.roster(chat_id)?)
            }
            Action::RemoveByName => {
                let participant = directory.remove_by_name(chat_id, argument)?;
                replies::removed(&participant, &directory.roster(chat_id)?)
            }
            Action::List => replies::roster(&directory.roster(chat_id)?),
            Action::Reset => {
                directory.reset(chat_id)?;
                replies::RESET_DONE.to_string()
            }
            Action::Help => replies::help(&self.version),
        };
        Ok(text)
    }
}
