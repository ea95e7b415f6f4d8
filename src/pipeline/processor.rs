//! Event processor: routes one event and emits the resulting post.
//!
//! Flow:
//! 1. `ChannelRouter::route` → one routing decision (or an error, nothing posted)
//! 2. empty payload → `Delivery::NothingToForward`, the poster is not called
//! 3. otherwise a single `post_message`; failures are returned, never retried
//!
//! Each call is independent; nothing is shared between events except the
//! keyword store behind the router.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::channels::MessagePoster;
use crate::error::ProcessError;
use crate::pipeline::router::ChannelRouter;
use crate::pipeline::types::IncomingMessage;

/// Outcome of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// A message was posted to `channel`.
    Posted { channel: String },
    /// The decision had no payload; nothing was posted.
    NothingToForward,
}

pub struct EventProcessor {
    router: ChannelRouter,
    poster: Arc<dyn MessagePoster>,
}

impl EventProcessor {
    pub fn new(router: ChannelRouter, poster: Arc<dyn MessagePoster>) -> Self {
        Self { router, poster }
    }

    pub async fn handle(&self, message: IncomingMessage) -> Result<Delivery, ProcessError> {
        let decision = self.router.route(&message).await.inspect_err(|e| {
            warn!(
                channel = %message.source_channel,
                ts = %message.timestamp,
                error = %e,
                "Routing failed"
            );
        })?;

        if decision.suppressed || decision.payload_text.is_empty() {
            debug!(ts = %message.timestamp, "Nothing to forward");
            return Ok(Delivery::NothingToForward);
        }

        self.poster
            .post_message(
                &decision.destination_channel,
                &decision.payload_text,
                decision.payload_blocks.as_ref(),
            )
            .await
            .map_err(ProcessError::Post)?;

        info!(
            channel = %decision.destination_channel,
            ts = %message.timestamp,
            "Response posted"
        );
        Ok(Delivery::Posted {
            channel: decision.destination_channel,
        })
    }
}
