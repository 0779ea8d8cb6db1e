//! Telegram Bot API transport (long polling).

use std::time::Duration;

use anyhow::{anyhow, Context};
use rollcall_shared::{ChatId, CommandEvent, Sender};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::transport::Transport;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl From<&User> for Sender {
    fn from(user: &User) -> Self {
        Sender {
            external_id: user.id.to_string(),
            handle: user.username.clone().unwrap_or_default(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone().unwrap_or_default(),
        }
    }
}

/// Turn an update into a command event. Updates without a message, without
/// an author or whose text is not a `/command` are ignored.
pub fn update_to_event(update: &Update) -> Option<CommandEvent> {
    let message = update.message.as_ref()?;
    let from = message.from.as_ref()?;
    let text = message.text.as_deref()?;

    debug!(sender = ?from.username, %text, "message");

    CommandEvent::parse(ChatId(message.chat.id), Sender::from(from), text)
}

pub struct TelegramTransport {
    client: reqwest::Client,
    /// `<api_url>/bot<token>`; never logged.
    endpoint: String,
    offset: i64,
    poll_timeout_secs: u64,
}

impl TelegramTransport {
    pub fn new(api_url: &str, token: &str, poll_timeout_secs: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs.saturating_add(10)))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            offset: 0,
            poll_timeout_secs,
        })
    }

    /// Check the token and log the bot account name.
    pub async fn authorize(&self) -> anyhow::Result<String> {
        let me: User = self.call("getMe", &json!({})).await?;
        let name = me.username.unwrap_or(me.first_name);
        info!(account = %name, "authorized on Telegram");
        Ok(name)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> anyhow::Result<T> {
        let response = self
            .client
            .post(format!("{}/{}", self.endpoint, method))
            .json(body)
            .send()
            .await
            .map_err(|e| anyhow!("{method} request failed: {}", e.without_url()))?;

        let parsed: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| anyhow!("{method} response unreadable: {}", e.without_url()))?;

        if !parsed.ok {
            return Err(anyhow!(
                "{method} rejected: {}",
                parsed.description.unwrap_or_default()
            ));
        }
        parsed
            .result
            .ok_or_else(|| anyhow!("{method} returned no result"))
    }
}

impl Transport for TelegramTransport {
    async fn next_events(&mut self) -> anyhow::Result<Option<Vec<CommandEvent>>> {
        let updates: Vec<Update> = self
            .call(
                "getUpdates",
                &json!({
                    "offset": self.offset,
                    "timeout": self.poll_timeout_secs,
                    "allowed_updates": ["message"],
                }),
            )
            .await?;

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset = last + 1;
        }

        Ok(Some(updates.iter().filter_map(update_to_event).collect()))
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> anyhow::Result<()> {
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                &json!({
                    "chat_id": chat_id.0,
                    "text": text,
                    "parse_mode": "Markdown",
                }),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Update {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_command_update_becomes_event() {
        let update = parse(
            r#"{
                "update_id": 10,
                "message": {
                    "message_id": 1,
                    "chat": {"id": -100, "type": "group"},
                    "from": {"id": 7, "is_bot": false, "first_name": "John", "username": "smith"},
                    "text": "/add@rollcall_bot @jones"
                }
            }"#,
        );

        let event = update_to_event(&update).unwrap();
        assert_eq!(event.chat_id, ChatId(-100));
        assert_eq!(event.verb, "add");
        assert_eq!(event.argument.trim(), "@jones");
        assert_eq!(event.sender.external_id, "7");
        assert_eq!(event.sender.handle, "smith");
        assert_eq!(event.sender.last_name, "");
    }

    #[test]
    fn test_plain_text_and_non_messages_are_ignored() {
        let chatter = parse(
            r#"{"update_id": 11, "message": {"chat": {"id": 1}, "from": {"id": 2, "first_name": "A"}, "text": "hi"}}"#,
        );
        assert!(update_to_event(&chatter).is_none());

        let sticker = parse(
            r#"{"update_id": 12, "message": {"chat": {"id": 1}, "from": {"id": 2, "first_name": "A"}}}"#,
        );
        assert!(update_to_event(&sticker).is_none());

        let edit = parse(r#"{"update_id": 13, "edited_message": {}}"#);
        assert!(update_to_event(&edit).is_none());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let transport = TelegramTransport::new("https://api.example.org/", "T0KEN", 30).unwrap();
        assert_eq!(transport.endpoint, "https://api.example.org/botT0KEN");
    }

    #[test]
    fn test_huge_poll_timeout_does_not_overflow() {
        let transport = TelegramTransport::new("https://api.example.org", "T0KEN", u64::MAX).unwrap();
        assert_eq!(transport.poll_timeout_secs, u64::MAX);
    }
}
