//! Transcript reconstruction for a node in a conversation tree.
//!
//! The builder walks parent links from the target node to the root. Each
//! visited node contributes its message, split into sentence units and
//! classified by [`crate::classifier`], plus one assistant entry holding the
//! full response. Node blocks are emitted oldest first.
//!
//! A single running flag tracks whether a user-role unit has been seen yet.
//! It starts `true` at the target node and flips to `false` after the first
//! unit classified as user, for the rest of the walk toward the root.

mod message;

pub use message::{Message, MessageRole};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::{classify_detailed, SpeakerRole};
use crate::config::ContextConfig;
use crate::error::{TreeError, TreeResult};
use crate::tree::{ConversationTree, Node, NodeId};

/// Placement of the assistant entry within one node's block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrder {
    /// Message-derived entries, then the assistant response.
    #[default]
    MessageFirst,
    /// The assistant response, then message-derived entries.
    AssistantFirst,
}

impl std::fmt::Display for EntryOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryOrder::MessageFirst => write!(f, "message_first"),
            EntryOrder::AssistantFirst => write!(f, "assistant_first"),
        }
    }
}

impl std::str::FromStr for EntryOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "message_first" => Ok(EntryOrder::MessageFirst),
            "assistant_first" => Ok(EntryOrder::AssistantFirst),
            _ => Err(format!("Unknown entry order: {}", s)),
        }
    }
}

/// Split text into sentence-like units.
///
/// A unit ends after `.`, `!` or `?` when followed by whitespace; the
/// whitespace run between units is dropped. The final unit may be empty when
/// the text ends in a boundary, and empty text yields one empty unit.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if !chars.peek().is_some_and(|(_, next)| next.is_whitespace()) {
            continue;
        }
        units.push(&text[start..i + c.len_utf8()]);
        while chars.peek().is_some_and(|(_, next)| next.is_whitespace()) {
            chars.next();
        }
        start = chars.peek().map_or(text.len(), |(j, _)| *j);
    }

    units.push(&text[start..]);
    units
}

/// Builds role-tagged transcripts from a tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextBuilder {
    config: ContextConfig,
}

impl ContextBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from loaded configuration.
    pub fn from_config(config: &ContextConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Set the per-node entry order.
    pub fn with_entry_order(mut self, entry_order: EntryOrder) -> Self {
        self.config.entry_order = entry_order;
        self
    }

    /// Drop zero-length sentence units instead of emitting empty entries.
    pub fn with_skip_empty_units(mut self, skip: bool) -> Self {
        self.config.skip_empty_units = skip;
        self
    }

    /// Transcript for `node_id`, oldest entries first.
    ///
    /// Fails with [`TreeError::NodeNotFound`] if the node, or any ancestor
    /// named by a parent link, is missing from the tree.
    pub fn build(&self, tree: &ConversationTree, node_id: &NodeId) -> TreeResult<Vec<Message>> {
        let target = tree
            .find_by_id(node_id)
            .ok_or_else(|| TreeError::NodeNotFound {
                node_id: node_id.to_string(),
            })?;

        let mut blocks: Vec<Vec<Message>> = Vec::new();
        let mut before_first_user = true;
        let mut current = Some(target);

        while let Some(node) = current {
            blocks.push(self.node_block(node, &mut before_first_user));
            current = match node.parent_id() {
                Some(parent_id) => Some(tree.find_by_id(parent_id).ok_or_else(|| {
                    TreeError::NodeNotFound {
                        node_id: parent_id.to_string(),
                    }
                })?),
                None => None,
            };
        }

        let nodes = blocks.len();
        let transcript: Vec<Message> = blocks.into_iter().rev().flatten().collect();
        debug!(
            node_id = %node_id,
            nodes,
            entries = transcript.len(),
            "Context built"
        );
        Ok(transcript)
    }

    fn node_block(&self, node: &Node, before_first_user: &mut bool) -> Vec<Message> {
        let mut block = Vec::new();

        for unit in split_sentences(node.message()) {
            if self.config.skip_empty_units && unit.is_empty() {
                continue;
            }
            let classification = classify_detailed(unit, *before_first_user);
            debug!(
                node_id = %node.id(),
                role = %classification.role,
                rule = ?classification.rule,
                before_first_user = *before_first_user,
                "Classified message unit"
            );
            if classification.role == SpeakerRole::User {
                *before_first_user = false;
            }
            block.push(Message::new(classification.role.into(), unit));
        }

        let assistant = Message::assistant(node.response());
        match self.config.entry_order {
            EntryOrder::MessageFirst => block.push(assistant),
            EntryOrder::AssistantFirst => block.insert(0, assistant),
        }
        block
    }
}
