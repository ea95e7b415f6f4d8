//! Keyword-gated message routing.
//!
//! Every posted message flows through:
//! 1. `ChannelRouter::route()`: classify the channel, run a command or match keywords
//! 2. `EventProcessor::handle()`: post the decision, or report nothing to forward

pub mod command;
pub mod matcher;
pub mod processor;
pub mod router;
pub mod types;

pub use command::Command;
pub use processor::{Delivery, EventProcessor};
pub use router::ChannelRouter;
pub use types::{ChannelRole, FetchedMessage, IncomingMessage, MessageBlocks, RoutingDecision};
