//! Keyword Relay: forwards chat messages that mention a managed keyword.

pub mod channels;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod store;
