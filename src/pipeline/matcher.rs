//! Keyword matching over message content.
//!
//! Two rules with different granularity:
//! - plain text: some whitespace-delimited word equals a keyword exactly
//! - blocks: some keyword is a substring of a text leaf in the block tree
//!
//! Empty keyword texts never match under either rule.

use std::collections::HashSet;

use crate::pipeline::types::MessageBlocks;
use crate::store::Keyword;

/// Whole-word equality against the message text.
pub fn matches_plain_text(text: &str, keywords: &[Keyword]) -> bool {
    let words: HashSet<&str> = text.split_whitespace().collect();
    keywords
        .iter()
        .any(|k| !k.text.is_empty() && words.contains(k.text.as_str()))
}

/// Substring containment against every text leaf of the block tree.
pub fn matches_blocks(blocks: &MessageBlocks, keywords: &[Keyword]) -> bool {
    let leaves = blocks.leaf_texts();
    keywords
        .iter()
        .filter(|k| !k.text.is_empty())
        .any(|k| leaves.iter().any(|leaf| leaf.contains(k.text.as_str())))
}

/// True if either rule fires.
pub fn contains_any_keyword(
    text: &str,
    blocks: Option<&MessageBlocks>,
    keywords: &[Keyword],
) -> bool {
    matches_plain_text(text, keywords) || blocks.is_some_and(|b| matches_blocks(b, keywords))
}
