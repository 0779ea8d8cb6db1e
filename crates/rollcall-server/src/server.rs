//! The bot's event loop.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::router::Router;
use crate::transport::Transport;

/// Delay before polling again after a failed poll.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Process commands one at a time, in arrival order, until the transport
/// closes.
pub async fn run<T: Transport>(transport: &mut T, router: &mut Router) -> anyhow::Result<()> {
    info!("waiting for commands");

    loop {
        let events = match transport.next_events().await {
            Ok(Some(events)) => events,
            Ok(None) => {
                info!("transport closed");
                return Ok(());
            }
            Err(e) => {
                warn!(error = %e, "polling failed, retrying");
                tokio::time::sleep(POLL_RETRY_DELAY).await;
                continue;
            }
        };

        for event in events {
            debug!(chat_id = %event.chat_id, verb = %event.verb, "event received");
            let reply = router.handle(&event);
            if let Err(e) = transport.send_text(event.chat_id, &reply).await {
                warn!(chat_id = %event.chat_id, error = %e, text = %reply, "failed to send reply");
            }
        }
    }
}
