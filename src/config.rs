//! Configuration types.
//!
//! Everything is read once at startup from the environment and never
//! changes for the life of the process.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default Slack Web API base URL.
pub const DEFAULT_SLACK_API_BASE: &str = "https://slack.com/api";

/// The three fixed channel identifiers the router works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Channel where keyword commands are issued and status replies are posted.
    pub control: String,
    /// Channel whose messages are scanned for keywords.
    pub source: String,
    /// Channel that matching source messages are forwarded to.
    pub target: String,
}

impl ChannelConfig {
    pub fn new(
        control: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            control: control.into(),
            source: source.into(),
            target: target.into(),
        }
    }

    /// Reject layouts where a role would be ambiguous or a forward would loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control == self.source {
            return Err(ConfigError::InvalidValue {
                key: "RELAY_SOURCE_CHANNEL".into(),
                message: "source channel must differ from the control channel".into(),
            });
        }
        if self.target == self.source {
            return Err(ConfigError::InvalidValue {
                key: "RELAY_TARGET_CHANNEL".into(),
                message: "target channel must differ from the source channel".into(),
            });
        }
        Ok(())
    }
}

/// Slack Web API client settings.
#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub bot_token: SecretString,
    pub api_base: String,
    pub request_timeout_ms: u64,
}

/// HTTP listener settings for the events endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Full relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub channels: ChannelConfig,
    pub slack: SlackConfig,
    pub server: ServerConfig,
    /// Path of the libSQL keyword database.
    pub db_path: String,
}

impl RelayConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let channels = ChannelConfig {
            control: required("RELAY_CONTROL_CHANNEL")?,
            source: required("RELAY_SOURCE_CHANNEL")?,
            target: required("RELAY_TARGET_CHANNEL")?,
        };
        channels.validate()?;

        let slack = SlackConfig {
            bot_token: SecretString::from(required("SLACK_BOT_TOKEN")?),
            api_base: lookup("SLACK_API_BASE")
                .unwrap_or_else(|| DEFAULT_SLACK_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            request_timeout_ms: parse_or(&lookup, "SLACK_REQUEST_TIMEOUT_MS", 10_000)?,
        };

        let defaults = ServerConfig::default();
        let server = ServerConfig {
            bind_addr: lookup("RELAY_BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_or(&lookup, "RELAY_PORT", defaults.port)?,
        };

        let db_path =
            lookup("RELAY_DB_PATH").unwrap_or_else(|| "./data/keyword-relay.db".to_string());

        Ok(Self {
            channels,
            slack,
            server,
            db_path,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
