//! The messaging channel as seen by the bot: a source of command events and
//! a sink for reply text.

use rollcall_shared::{ChatId, CommandEvent};

#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Wait for the next batch of commands. `Ok(None)` means the channel is
    /// closed and the server should stop.
    async fn next_events(&mut self) -> anyhow::Result<Option<Vec<CommandEvent>>>;

    /// Deliver Markdown-formatted text to a chat.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> anyhow::Result<()>;
}
