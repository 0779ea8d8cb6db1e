//! Chat reply texts.

use rollcall_shared::markup::{bold, escape};
use rollcall_store::Participant;

pub const WRONG_COMMAND: &str = "Wrong command";
pub const PARAMETER_TOO_LONG: &str = "Parameter too long";
pub const NUMERIC_NAME: &str = "Fail. UserName as a number";
pub const WRONG_PARAMETER: &str = "Wrong parameter";
pub const NO_PARTICIPANTS: &str = "No participants";
pub const RESET_DONE: &str = "All participants was deleted";

/// Numbered roster, oldest first, or the empty-roster sentinel.
pub fn roster(participants: &[Participant]) -> String {
    if participants.is_empty() {
        return NO_PARTICIPANTS.to_string();
    }

    let mut text = String::from("Participants:\n");
    for (i, p) in participants.iter().enumerate() {
        text.push_str(&format!(" {} {}\n", bold(&format!("{})", i + 1)), escape(&p.name())));
    }
    text
}

pub fn added(participant: &Participant, participants: &[Participant]) -> String {
    format!(
        "{} {}\n{}",
        bold("Added"),
        escape(&participant.link()),
        roster(participants)
    )
}

pub fn removed(participant: &Participant, participants: &[Participant]) -> String {
    format!(
        "{} {}\n{}",
        bold("Removed"),
        escape(&participant.link()),
        roster(participants)
    )
}

pub fn help(version: &str) -> String {
    format!(
        "*Help:*\n\
         /list - participants list\n\
         /add - add yourself or someone\n\
         /rm - remove yourself or someone\n\
         /reset - remove all\n\
         /help - help\n\
         \n\
         *Examples:*\n\
         ``` /add @smith\n \
         /add My brother John\n \
         /rm @smith\n \
         /rm My brother John\n \
         /rm 3\n\
         ```\n\
         The last example is the removal of the third participant\n\n\
         _Version: {version}_"
    )
}
