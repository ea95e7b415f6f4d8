//! Collaborator traits for the chat platform.

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::pipeline::types::{FetchedMessage, MessageBlocks};

/// Looks up the full content of a posted message.
#[async_trait]
pub trait MessageLookup: Send + Sync {
    async fn fetch_by_timestamp(
        &self,
        channel: &str,
        ts: &str,
    ) -> Result<FetchedMessage, ChannelError>;
}

/// Posts a message to a channel. Failed posts are not retried.
#[async_trait]
pub trait MessagePoster: Send + Sync {
    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        blocks: Option<&MessageBlocks>,
    ) -> Result<(), ChannelError>;
}
