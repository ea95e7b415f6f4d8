//! Slack Events API endpoint.
//!
//! Accepts `url_verification` handshakes and `event_callback` deliveries.
//! Top-level human messages are handed to the `EventProcessor` on their own
//! task and the request is acknowledged immediately. Posts by apps, edits
//! and other subtypes, and thread replies are acknowledged and dropped.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::pipeline::processor::EventProcessor;
use crate::pipeline::types::{IncomingMessage, MessageBlocks};

/// Outer envelope of an Events API request.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Envelope {
    UrlVerification { challenge: String },
    EventCallback { event: serde_json::Value },
    #[serde(other)]
    Other,
}

/// The fields of a `message` event the relay cares about.
#[derive(Debug, Deserialize)]
struct MessageEvent {
    #[serde(rename = "type")]
    kind: String,
    channel: Option<String>,
    user: Option<String>,
    #[serde(default)]
    text: String,
    ts: Option<String>,
    thread_ts: Option<String>,
    subtype: Option<String>,
    bot_id: Option<String>,
    blocks: Option<serde_json::Value>,
}

impl MessageEvent {
    /// Convert to an `IncomingMessage`, or say why the event is skipped.
    fn into_incoming(self) -> Result<IncomingMessage, &'static str> {
        if self.kind != "message" {
            return Err("not a message event");
        }
        if self.subtype.is_some() {
            return Err("message subtype");
        }
        if self.bot_id.is_some() || self.user.is_none() {
            return Err("posted by an app");
        }
        let (Some(channel), Some(ts)) = (self.channel, self.ts) else {
            return Err("missing channel or ts");
        };
        if self.thread_ts.as_deref().is_some_and(|t| t != ts) {
            return Err("thread reply");
        }

        Ok(IncomingMessage {
            text: self.text,
            blocks: self.blocks.map(MessageBlocks::from_raw),
            timestamp: ts,
            source_channel: channel,
            source_user: self.user,
        })
    }
}

/// Build the Axum router with the events and health routes.
pub fn event_routes(processor: Arc<EventProcessor>) -> Router {
    Router::new()
        .route("/slack/events", post(handle_events))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(processor)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "keyword-relay"
    }))
}

// ── Events ──────────────────────────────────────────────────────────────

async fn handle_events(State(processor): State<Arc<EventProcessor>>, body: Bytes) -> Response {
    let envelope: Envelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Rejected malformed event payload");
            return (StatusCode::BAD_REQUEST, "malformed payload").into_response();
        }
    };

    match envelope {
        Envelope::UrlVerification { challenge } => {
            info!("Answering url_verification challenge");
            Json(serde_json::json!({ "challenge": challenge })).into_response()
        }
        Envelope::EventCallback { event } => {
            let incoming = serde_json::from_value::<MessageEvent>(event)
                .map_err(|_| "unrecognised event shape")
                .and_then(MessageEvent::into_incoming);

            match incoming {
                Ok(message) => {
                    debug!(
                        channel = %message.source_channel,
                        ts = %message.timestamp,
                        "Accepted message event"
                    );
                    tokio::spawn(async move {
                        let channel = message.source_channel.clone();
                        let ts = message.timestamp.clone();
                        match processor.handle(message).await {
                            Ok(delivery) => debug!(%channel, %ts, ?delivery, "Event handled"),
                            Err(e) => warn!(%channel, %ts, error = %e, "Event failed"),
                        }
                    });
                }
                Err(reason) => debug!(reason, "Skipped event"),
            }
            StatusCode::OK.into_response()
        }
        Envelope::Other => StatusCode::OK.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use super::*;
    use crate::channels::{MessageLookup, MessagePoster};
    use crate::config::ChannelConfig;
    use crate::error::ChannelError;
    use crate::pipeline::router::ChannelRouter;
    use crate::pipeline::types::FetchedMessage;
    use crate::store::{KeywordStore, LibSqlBackend};

    struct NoLookup;

    #[async_trait]
    impl MessageLookup for NoLookup {
        async fn fetch_by_timestamp(&self, channel: &str, ts: &str) -> Result<FetchedMessage, ChannelError> {
            Err(ChannelError::MessageNotFound {
                channel: channel.to_string(),
                ts: ts.to_string(),
            })
        }
    }

    struct ChannelPoster(mpsc::UnboundedSender<(String, String)>);

    #[async_trait]
    impl MessagePoster for ChannelPoster {
        async fn post_message(
            &self,
            channel: &str,
            text: &str,
            _blocks: Option<&MessageBlocks>,
        ) -> Result<(), ChannelError> {
            let _ = self.0.send((channel.to_string(), text.to_string()));
            Ok(())
        }
    }

    async fn app() -> (Router, mpsc::UnboundedReceiver<(String, String)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let store = KeywordStore::new(Arc::new(LibSqlBackend::new_memory().await.unwrap()));
        let router = ChannelRouter::new(
            ChannelConfig::new("C_CONTROL", "C_SOURCE", "C_TARGET"),
            store,
            Arc::new(NoLookup),
        );
        let processor = Arc::new(EventProcessor::new(router, Arc::new(ChannelPoster(tx))));
        (event_routes(processor), rx)
    }

    async fn send(app: Router, body: Value) -> (StatusCode, Vec<u8>) {
        let request = Request::post("/slack/events")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    fn message_event(event: Value) -> Value {
        json!({ "type": "event_callback", "event": event })
    }

    #[tokio::test]
    async fn answers_url_verification() {
        let (app, _) = app().await;
        let (status, body) = send(app, json!({ "type": "url_verification", "challenge": "abc123" })).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["challenge"], "abc123");
    }

    #[tokio::test]
    async fn malformed_payload_is_bad_request() {
        let (app, _) = app().await;
        let request = Request::post("/slack/events")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn control_message_is_processed() {
        let (app, mut rx) = app().await;
        let (status, _) = send(
            app,
            message_event(json!({
                "type": "message",
                "channel": "C_CONTROL",
                "user": "U1",
                "text": "add foo bar",
                "ts": "1700000000.000100"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let posted = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(posted, ("C_CONTROL".to_string(), "Added keyword: foo bar".to_string()));
    }

    #[test]
    fn filters_match_trigger_rules() {
        let base = json!({
            "type": "message",
            "channel": "C_SOURCE",
            "user": "U1",
            "text": "hello",
            "ts": "2.0"
        });
        let decode = |patch: Value| {
            let mut event = base.clone();
            for (k, v) in patch.as_object().unwrap() {
                event[k] = v.clone();
            }
            serde_json::from_value::<MessageEvent>(event)
                .unwrap()
                .into_incoming()
        };

        let accepted = decode(json!({})).unwrap();
        assert_eq!(accepted.source_channel, "C_SOURCE");
        assert_eq!(accepted.timestamp, "2.0");
        assert_eq!(accepted.source_user.as_deref(), Some("U1"));

        // Thread parent carries thread_ts equal to its own ts.
        assert!(decode(json!({ "thread_ts": "2.0" })).is_ok());

        assert_eq!(decode(json!({ "thread_ts": "1.0" })).unwrap_err(), "thread reply");
        assert_eq!(decode(json!({ "user": null })).unwrap_err(), "posted by an app");
        assert_eq!(decode(json!({ "bot_id": "B1" })).unwrap_err(), "posted by an app");
        assert_eq!(decode(json!({ "subtype": "message_changed" })).unwrap_err(), "message subtype");
        assert_eq!(decode(json!({ "type": "reaction_added" })).unwrap_err(), "not a message event");
    }

    #[tokio::test]
    async fn unrelated_callbacks_are_acknowledged() {
        let (app, _) = app().await;
        let (status, _) = send(app, json!({ "type": "app_rate_limited" })).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _) = app().await;
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
