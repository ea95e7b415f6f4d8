//! Chat platform I/O: collaborator traits, the Slack client, and the events endpoint.

pub mod channel;
pub mod events;
pub mod slack;

pub use channel::*;
pub use events::event_routes;
pub use slack::SlackClient;
