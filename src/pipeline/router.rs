//! Channel router: turns one incoming event into one routing decision.
//!
//! The event's channel alone picks the branch:
//! - control: parse a command, run it against the keyword store, reply in control
//! - source: fetch the full message, forward it to target if a keyword matches
//! - anything else: reply "Invalid channel" in control
//!
//! A store or lookup failure aborts the decision; no partial reply is built.

use std::sync::Arc;

use tracing::{debug, info};

use crate::channels::MessageLookup;
use crate::config::ChannelConfig;
use crate::error::RouterError;
use crate::pipeline::command::{Command, HELP_TEXT};
use crate::pipeline::matcher;
use crate::pipeline::types::{ChannelRole, IncomingMessage, RoutingDecision};
use crate::store::KeywordStore;

/// Reply for events from channels the router does not know.
pub const INVALID_CHANNEL_TEXT: &str = "Invalid channel";

/// Reply when `add`/`delete` is given no keyword.
pub const EMPTY_KEYWORD_TEXT: &str = "Keyword must not be empty";

pub struct ChannelRouter {
    channels: ChannelConfig,
    store: KeywordStore,
    lookup: Arc<dyn MessageLookup>,
}

impl ChannelRouter {
    pub fn new(
        channels: ChannelConfig,
        store: KeywordStore,
        lookup: Arc<dyn MessageLookup>,
    ) -> Self {
        Self {
            channels,
            store,
            lookup,
        }
    }

    /// Classify a channel id. Target is an output only and classifies as `Other`.
    pub fn classify(&self, channel: &str) -> ChannelRole {
        if channel == self.channels.control {
            ChannelRole::Control
        } else if channel == self.channels.source {
            ChannelRole::Source
        } else {
            ChannelRole::Other
        }
    }

    pub async fn route(&self, message: &IncomingMessage) -> Result<RoutingDecision, RouterError> {
        let role = self.classify(&message.source_channel);
        debug!(
            channel = %message.source_channel,
            ts = %message.timestamp,
            role = role.label(),
            "Routing event"
        );

        match role {
            ChannelRole::Control => {
                let reply = self.run_command(Command::parse(&message.text)).await?;
                Ok(RoutingDecision::reply(&self.channels.control, reply))
            }
            ChannelRole::Source => self.route_source(message).await,
            ChannelRole::Other => Ok(RoutingDecision::reply(
                &self.channels.control,
                INVALID_CHANNEL_TEXT,
            )),
        }
    }

    /// Execute a command and build its control-channel reply.
    async fn run_command(&self, command: Command) -> Result<String, RouterError> {
        debug!(command = command.label(), "Running control command");

        let reply = match command {
            Command::Add(keyword) if keyword.is_empty() => EMPTY_KEYWORD_TEXT.to_string(),
            Command::Add(keyword) => {
                self.store.insert(&keyword).await?;
                format!("Added keyword: {keyword}")
            }
            Command::Get => {
                let keywords = self.store.list_all().await?;
                let texts: Vec<&str> = keywords.iter().map(|k| k.text.as_str()).collect();
                format!("Keywords: {}", texts.join(", "))
            }
            Command::Delete(keyword) if keyword.is_empty() => EMPTY_KEYWORD_TEXT.to_string(),
            Command::Delete(keyword) => {
                if self.store.delete_first_matching(&keyword).await?.deleted {
                    format!("Deleted keyword: {keyword}")
                } else {
                    format!("Keyword: {keyword} not found")
                }
            }
            Command::Help => HELP_TEXT.to_string(),
            Command::None => String::new(),
        };
        Ok(reply)
    }

    async fn route_source(&self, message: &IncomingMessage) -> Result<RoutingDecision, RouterError> {
        let fetched = self
            .lookup
            .fetch_by_timestamp(&message.source_channel, &message.timestamp)
            .await?;
        let keywords = self.store.list_all().await?;

        if matcher::contains_any_keyword(&fetched.text, fetched.blocks.as_ref(), &keywords) {
            info!(
                from = %message.source_channel,
                to = %self.channels.target,
                ts = %message.timestamp,
                "Keyword matched, forwarding message"
            );
            Ok(RoutingDecision::forward(&self.channels.target, fetched))
        } else {
            debug!(ts = %message.timestamp, keywords = keywords.len(), "No keyword matched");
            Ok(RoutingDecision::suppressed(&self.channels.control))
        }
    }
}
