use serde::{Deserialize, Serialize};

/// Chat identifier as assigned by the messaging channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(pub i64);

impl ChatId {
    /// Name of the storage partition holding this chat's roster.
    pub fn partition_name(&self) -> String {
        self.0.to_string()
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Identity fields of a message author, as reported by the transport.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sender {
    pub external_id: String,
    pub handle: String,
    pub first_name: String,
    pub last_name: String,
}

/// A `/verb argument` command received in a chat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandEvent {
    pub chat_id: ChatId,
    pub sender: Sender,
    /// Command name without the leading slash.
    pub verb: String,
    /// Everything after the verb, untrimmed.
    pub argument: String,
}

impl CommandEvent {
    /// Split a raw message text such as `/add@rollcall_bot My brother` into a
    /// command event. Returns `None` when the text is not a command.
    pub fn parse(chat_id: ChatId, sender: Sender, text: &str) -> Option<Self> {
        let rest = text.strip_prefix('/')?;
        let (head, argument) = match rest.find(char::is_whitespace) {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };

        // Group chats address commands as `/verb@botname`.
        let verb = head.split('@').next().unwrap_or_default();
        if verb.is_empty() {
            return None;
        }

        Some(Self {
            chat_id,
            sender,
            verb: verb.to_string(),
            argument: argument.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_command() {
        let event = CommandEvent::parse(ChatId(1), Sender::default(), "/list").unwrap();
        assert_eq!(event.verb, "list");
        assert_eq!(event.argument, "");
    }

    #[test]
    fn test_parse_with_bot_suffix_and_argument() {
        let event =
            CommandEvent::parse(ChatId(1), Sender::default(), "/add@rollcall_bot  My brother")
                .unwrap();
        assert_eq!(event.verb, "add");
        assert_eq!(event.argument.trim(), "My brother");
    }

    #[test]
    fn test_parse_rejects_non_commands() {
        assert!(CommandEvent::parse(ChatId(1), Sender::default(), "hello").is_none());
        assert!(CommandEvent::parse(ChatId(1), Sender::default(), "/").is_none());
        assert!(CommandEvent::parse(ChatId(1), Sender::default(), "/@bot").is_none());
    }

    #[test]
    fn test_partition_name_is_decimal() {
        assert_eq!(ChatId(-100123).partition_name(), "-100123");
    }
}
