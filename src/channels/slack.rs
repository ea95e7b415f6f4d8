//! Slack Web API client: message lookup and posting.
//!
//! `conversations.history` serves the lookup (`latest=ts`, `inclusive`,
//! `limit=1`), `chat.postMessage` serves posting.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::channels::{MessageLookup, MessagePoster};
use crate::config::SlackConfig;
use crate::error::ChannelError;
use crate::pipeline::types::{FetchedMessage, MessageBlocks};

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    ok: bool,
    #[serde(default)]
    messages: Vec<HistoryMessage>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryMessage {
    ts: String,
    #[serde(default)]
    text: String,
    blocks: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
}

/// Slack Web API client authenticated with a bot token.
pub struct SlackClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: SecretString,
}

impl SlackClient {
    pub fn new(config: &SlackConfig) -> Result<Self, ChannelError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .map_err(|e| ChannelError::Http(format!("failed to create slack client: {e}")))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
        })
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/{method}", self.api_base)
    }
}

#[async_trait]
impl MessageLookup for SlackClient {
    async fn fetch_by_timestamp(
        &self,
        channel: &str,
        ts: &str,
    ) -> Result<FetchedMessage, ChannelError> {
        let fetch_failed = |reason: String| ChannelError::FetchFailed {
            channel: channel.to_string(),
            ts: ts.to_string(),
            reason,
        };

        let resp = self
            .http
            .get(self.api_url("conversations.history"))
            .bearer_auth(self.bot_token.expose_secret())
            .query(&[
                ("channel", channel),
                ("latest", ts),
                ("inclusive", "true"),
                ("limit", "1"),
            ])
            .send()
            .await
            .map_err(|e| fetch_failed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(fetch_failed(format!("HTTP {}", resp.status())));
        }

        let body: HistoryResponse = resp
            .json()
            .await
            .map_err(|e| fetch_failed(format!("invalid response: {e}")))?;

        if !body.ok {
            return Err(fetch_failed(
                body.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        let message = body
            .messages
            .into_iter()
            .find(|m| m.ts == ts)
            .ok_or_else(|| ChannelError::MessageNotFound {
                channel: channel.to_string(),
                ts: ts.to_string(),
            })?;

        tracing::debug!(channel, ts, "Fetched message from Slack");
        Ok(FetchedMessage {
            text: message.text,
            blocks: message.blocks.map(MessageBlocks::from_raw),
        })
    }
}

#[async_trait]
impl MessagePoster for SlackClient {
    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        blocks: Option<&MessageBlocks>,
    ) -> Result<(), ChannelError> {
        let send_failed = |reason: String| ChannelError::SendFailed {
            channel: channel.to_string(),
            reason,
        };

        let mut payload = json!({
            "channel": channel,
            "text": text,
        });
        if let Some(blocks) = blocks {
            payload["blocks"] = blocks.raw().clone();
        }

        let resp = self
            .http
            .post(self.api_url("chat.postMessage"))
            .bearer_auth(self.bot_token.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|e| send_failed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(send_failed(format!("HTTP {}", resp.status())));
        }

        let body: PostMessageResponse = resp
            .json()
            .await
            .map_err(|e| send_failed(format!("invalid response: {e}")))?;

        if !body.ok {
            return Err(send_failed(
                body.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        tracing::debug!(channel, "Posted message to Slack");
        Ok(())
    }
}
