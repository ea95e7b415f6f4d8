//! Error types for the keyword relay.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Keyword store errors.
///
/// `Query` covers every page fetch, `Write` covers inserts and deletes.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Keyword query failed: {0}")]
    Query(String),

    #[error("Keyword write failed: {0}")]
    Write(String),

    #[error("Connection error: {0}")]
    Pool(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Errors from the chat platform collaborators (message lookup and posting).
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to fetch message {ts} in {channel}: {reason}")]
    FetchFailed {
        channel: String,
        ts: String,
        reason: String,
    },

    #[error("Message {ts} not found in {channel}")]
    MessageNotFound { channel: String, ts: String },

    #[error("Failed to post to {channel}: {reason}")]
    SendFailed { channel: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Failure of a single routing decision. No partial decision is produced.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Fetch(#[from] ChannelError),
}

/// Failure while routing an event or emitting its response.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Routing failed: {0}")]
    Route(#[from] RouterError),

    #[error("Post failed: {0}")]
    Post(ChannelError),
}
