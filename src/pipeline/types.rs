//! Shared types for the routing pipeline.

use serde::{Deserialize, Serialize};

// ── Rich content tree ───────────────────────────────────────────────

/// Top-level content block of a message.
///
/// Only the kinds that can carry text are modelled; everything else
/// decodes to `Unknown`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    RichText {
        #[serde(default)]
        elements: Vec<RichTextElement>,
    },
    Section {
        #[serde(default)]
        text: Option<TextObject>,
        #[serde(default)]
        fields: Vec<TextObject>,
    },
    #[serde(other)]
    Unknown,
}

/// Node inside a `rich_text` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichTextElement {
    RichTextSection {
        #[serde(default)]
        elements: Vec<RichTextElement>,
    },
    RichTextList {
        #[serde(default)]
        elements: Vec<RichTextElement>,
    },
    RichTextQuote {
        #[serde(default)]
        elements: Vec<RichTextElement>,
    },
    RichTextPreformatted {
        #[serde(default)]
        elements: Vec<RichTextElement>,
    },
    Text {
        text: String,
    },
    Link {
        #[serde(default)]
        url: String,
        #[serde(default)]
        text: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

/// `plain_text` / `mrkdwn` text object used by section blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextObject {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl Block {
    /// Visit every text-bearing leaf under this block, depth first.
    pub fn visit_text<'a>(&'a self, visit: &mut dyn FnMut(&'a str)) {
        match self {
            Self::RichText { elements } => {
                for element in elements {
                    element.visit_text(visit);
                }
            }
            Self::Section { text, fields } => {
                for object in text.iter().chain(fields) {
                    visit(&object.text);
                }
            }
            Self::Unknown => {}
        }
    }
}

impl RichTextElement {
    fn visit_text<'a>(&'a self, visit: &mut dyn FnMut(&'a str)) {
        match self {
            Self::RichTextSection { elements }
            | Self::RichTextList { elements }
            | Self::RichTextQuote { elements }
            | Self::RichTextPreformatted { elements } => {
                for element in elements {
                    element.visit_text(visit);
                }
            }
            Self::Text { text } => visit(text),
            Self::Link {
                text: Some(text), ..
            } => visit(text),
            Self::Link { text: None, .. } | Self::Unknown => {}
        }
    }
}

/// A message's block list, kept both as received and as a typed tree.
///
/// The raw JSON is what gets forwarded, so node kinds the tree does not
/// model survive a forward untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageBlocks {
    raw: serde_json::Value,
    tree: Vec<Block>,
}

impl MessageBlocks {
    /// Decode a block list. Blocks that fail to decode become `Unknown`.
    pub fn from_raw(raw: serde_json::Value) -> Self {
        let tree = raw
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .map(|b| serde_json::from_value(b.clone()).unwrap_or(Block::Unknown))
                    .collect()
            })
            .unwrap_or_default();
        Self { raw, tree }
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }

    pub fn tree(&self) -> &[Block] {
        &self.tree
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Every text-bearing leaf in document order.
    pub fn leaf_texts<'a>(&'a self) -> Vec<&'a str> {
        let mut out = Vec::new();
        for block in &self.tree {
            block.visit_text(&mut |text: &'a str| out.push(text));
        }
        out
    }
}

// ── Inbound ─────────────────────────────────────────────────────────

/// A message-posted event as delivered by the ingestion endpoint.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub text: String,
    pub blocks: Option<MessageBlocks>,
    /// Channel-native ordering token (Slack `ts`).
    pub timestamp: String,
    pub source_channel: String,
    /// `None` for posts made by apps.
    pub source_user: Option<String>,
}

/// Full message content returned by the message-lookup collaborator.
#[derive(Debug, Clone)]
pub struct FetchedMessage {
    pub text: String,
    pub blocks: Option<MessageBlocks>,
}

// ── Routing ─────────────────────────────────────────────────────────

/// Role of an event's channel. Derived per event, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRole {
    Control,
    Source,
    Other,
}

impl ChannelRole {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::Source => "source",
            Self::Other => "other",
        }
    }
}

/// Where to post what, or nothing at all.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingDecision {
    pub destination_channel: String,
    pub payload_text: String,
    pub payload_blocks: Option<MessageBlocks>,
    /// True when there is nothing to post.
    pub suppressed: bool,
}

impl RoutingDecision {
    /// A plain-text reply. An empty text yields a suppressed decision.
    pub fn reply(channel: impl Into<String>, text: impl Into<String>) -> Self {
        let payload_text = text.into();
        Self {
            destination_channel: channel.into(),
            suppressed: payload_text.is_empty(),
            payload_text,
            payload_blocks: None,
        }
    }

    /// Forward a message's text and blocks unmodified.
    pub fn forward(channel: impl Into<String>, message: FetchedMessage) -> Self {
        Self {
            destination_channel: channel.into(),
            suppressed: message.text.is_empty(),
            payload_text: message.text,
            payload_blocks: message.blocks,
        }
    }

    /// Nothing to post.
    pub fn suppressed(channel: impl Into<String>) -> Self {
        Self::reply(channel, String::new())
    }
}
