//! Conversation tree entity model and branching operations.
//!
//! A [`Node`] holds one user message and the assistant response it produced.
//! The response is split into [`Segment`]s, and follow-up nodes attach either
//! to the node as a whole (general children) or to one segment
//! (segment-scoped children).
//!
//! Ownership runs strictly downward: a node owns its general children and its
//! segments, and each segment owns its scoped children. The parent link is a
//! plain [`NodeId`] resolved through [`ConversationTree`].

mod conversation;
mod export;
mod segment;
mod shared;


pub use conversation::{ConversationTree, NodeMut, PreOrder};
pub use export::{NodeExport, SegmentExport, TreeExport, TreeStats};
pub use segment::{segment_response, Segment};
pub use shared::SharedTree;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{TreeError, TreeResult};

/// Opaque, immutable node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Options accepted by the branching operations.
///
/// No options are recognized yet; the type reserves the parameter so callers
/// do not break when options are introduced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct BranchOptions {}

/// One (user message, assistant response) turn and its branches.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    message: String,
    response: String,
    segments: Vec<Segment>,
    children: Vec<Node>,
    parent: Option<NodeId>,
    created_at: DateTime<Utc>,
}

impl Node {
    pub(crate) fn new(
        message: impl Into<String>,
        response: impl Into<String>,
        parent: Option<NodeId>,
    ) -> Self {
        let response = response.into();
        let segments = segment_response(&response);
        let node = Self {
            id: NodeId::generate(),
            message: message.into(),
            response,
            segments,
            children: Vec::new(),
            parent,
            created_at: Utc::now(),
        };
        debug!(
            node_id = %node.id,
            parent_id = ?node.parent.as_ref().map(NodeId::as_str),
            segments = node.segments.len(),
            "Node created"
        );
        node
    }

    /// Unique identifier assigned at creation.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Text authored to elicit the response.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Full assistant response text.
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Segments derived from the current response.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// General follow-up nodes, in insertion order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Identifier of the node this one branched from; `None` for a root.
    pub fn parent_id(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    /// When the node was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replace the response and rebuild its segments.
    ///
    /// Segment-scoped children of the previous response are discarded along
    /// with the old segments. General children are kept.
    pub fn set_response(&mut self, response: impl Into<String>) {
        let discarded: usize = self.segments.iter().map(|s| s.children.len()).sum();
        self.response = response.into();
        self.segments = segment_response(&self.response);
        debug!(
            node_id = %self.id,
            segments = self.segments.len(),
            discarded_branches = discarded,
            "Response re-segmented"
        );
    }

    /// Append a general follow-up and return it.
    pub fn add_child(
        &mut self,
        message: impl Into<String>,
        response: impl Into<String>,
    ) -> &mut Node {
        self.add_child_with_options(message, response, BranchOptions::default())
    }

    /// Append a general follow-up with branching options.
    pub fn add_child_with_options(
        &mut self,
        message: impl Into<String>,
        response: impl Into<String>,
        _options: BranchOptions,
    ) -> &mut Node {
        let child = Node::new(message, response, Some(self.id.clone()));
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Append a follow-up scoped to the segment at `segment_index`.
    ///
    /// Fails with [`TreeError::SegmentOutOfRange`] without touching the node
    /// when the index is not in `0..segments().len()`.
    pub fn add_segment_child(
        &mut self,
        segment_index: usize,
        message: impl Into<String>,
        response: impl Into<String>,
    ) -> TreeResult<&mut Node> {
        self.add_segment_child_with_options(
            segment_index,
            message,
            response,
            BranchOptions::default(),
        )
    }

    /// Append a segment-scoped follow-up with branching options.
    pub fn add_segment_child_with_options(
        &mut self,
        segment_index: usize,
        message: impl Into<String>,
        response: impl Into<String>,
        _options: BranchOptions,
    ) -> TreeResult<&mut Node> {
        let count = self.segments.len();
        if segment_index >= count {
            warn!(
                node_id = %self.id,
                segment_index,
                segment_count = count,
                "Rejected segment-scoped branch"
            );
            return Err(TreeError::SegmentOutOfRange {
                index: segment_index,
                count,
            });
        }

        let child = Node::new(message, response, Some(self.id.clone()));
        let segment = &mut self.segments[segment_index];
        segment.children.push(child);
        let last = segment.children.len() - 1;
        Ok(&mut segment.children[last])
    }

    /// Segment at `index`, if any.
    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Children scoped to the segment at `index`; empty when out of range.
    pub fn segment_children(&self, index: usize) -> &[Node] {
        self.segments
            .get(index)
            .map(|s| s.children.as_slice())
            .unwrap_or(&[])
    }

    /// General children followed by segment-scoped children in segment order.
    pub fn all_children(&self) -> Vec<&Node> {
        self.children
            .iter()
            .chain(self.segments.iter().flat_map(|s| s.children.iter()))
            .collect()
    }

    /// Whether this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether this node has no children of either kind.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.segments.iter().all(|s| s.children.is_empty())
    }

    /// First direct child (general or segment-scoped) with exactly `message`.
    pub fn find_child_by_message(&self, message: &str) -> Option<&Node> {
        self.all_children()
            .into_iter()
            .find(|child| child.message == message)
    }

    /// Mutable access to every direct child, general ones first.
    pub(crate) fn all_children_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.children.iter_mut().chain(
            self.segments
                .iter_mut()
                .flat_map(|s| s.children.iter_mut()),
        )
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.message.chars().take(50).collect();
        write!(
            f,
            "Node(message='{}...', segments={}, children={})",
            preview,
            self.segments.len(),
            self.all_children().len()
        )
    }
}
