//! Tree ownership, id-addressed mutations and read-only index queries.

use chrono::{DateTime, Utc};
use std::fmt;
use std::ops::{Deref, DerefMut};
use tracing::{info, warn};
use uuid::Uuid;

use super::{BranchOptions, Node, NodeId, TreeExport, TreeStats};
use crate::context::{ContextBuilder, Message};
use crate::error::{AppResult, TreeError, TreeResult};

/// A conversation tree: at most one root plus metadata.
///
/// Traversals are iterative and cover both general and segment-scoped
/// children, visiting general children before segment-scoped ones.
#[derive(Debug, Clone)]
pub struct ConversationTree {
    tree_id: String,
    root: Option<Node>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConversationTree {
    /// Create an empty tree with a generated id.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// Create an empty tree with a caller-supplied id.
    pub fn with_id(tree_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            tree_id: tree_id.into(),
            root: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Tree identifier.
    pub fn tree_id(&self) -> &str {
        &self.tree_id
    }

    /// When the tree was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the tree was last mutated.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The root node, if one was created.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    /// Create the root node.
    ///
    /// Fails with [`TreeError::RootAlreadyExists`] if the tree already has
    /// one; the existing root is left untouched.
    pub fn create_root(
        &mut self,
        message: impl Into<String>,
        response: impl Into<String>,
    ) -> TreeResult<&mut Node> {
        if let Some(existing) = &self.root {
            warn!(
                tree_id = %self.tree_id,
                root_id = %existing.id(),
                "Rejected second root"
            );
            return Err(TreeError::RootAlreadyExists {
                root_id: existing.id().to_string(),
            });
        }

        let root = Node::new(message, response, None);
        info!(tree_id = %self.tree_id, root_id = %root.id(), "Root node created");
        self.touch();
        Ok(self.root.insert(root))
    }

    /// Append a general child under the node with `parent_id`.
    pub fn add_child(
        &mut self,
        parent_id: &NodeId,
        message: impl Into<String>,
        response: impl Into<String>,
    ) -> TreeResult<&Node> {
        self.add_child_with_options(parent_id, message, response, BranchOptions::default())
    }

    /// Append a general child with branching options.
    pub fn add_child_with_options(
        &mut self,
        parent_id: &NodeId,
        message: impl Into<String>,
        response: impl Into<String>,
        options: BranchOptions,
    ) -> TreeResult<&Node> {
        let parent = self.require_mut(parent_id)?;
        let child = parent.add_child_with_options(message, response, options);
        let child_id = child.id().clone();
        self.touch();
        self.require(&child_id)
    }

    /// Append a segment-scoped child under the node with `parent_id`.
    pub fn add_segment_child(
        &mut self,
        parent_id: &NodeId,
        segment_index: usize,
        message: impl Into<String>,
        response: impl Into<String>,
    ) -> TreeResult<&Node> {
        self.add_segment_child_with_options(
            parent_id,
            segment_index,
            message,
            response,
            BranchOptions::default(),
        )
    }

    /// Append a segment-scoped child with branching options.
    pub fn add_segment_child_with_options(
        &mut self,
        parent_id: &NodeId,
        segment_index: usize,
        message: impl Into<String>,
        response: impl Into<String>,
        options: BranchOptions,
    ) -> TreeResult<&Node> {
        let parent = self.require_mut(parent_id)?;
        let child =
            parent.add_segment_child_with_options(segment_index, message, response, options)?;
        let child_id = child.id().clone();
        self.touch();
        self.require(&child_id)
    }

    /// Replace a node's response, rebuilding its segments.
    pub fn set_response(
        &mut self,
        node_id: &NodeId,
        response: impl Into<String>,
    ) -> TreeResult<&Node> {
        self.require_mut(node_id)?.set_response(response);
        self.touch();
        self.require(node_id)
    }

    /// Mutable access to a node for direct branching.
    ///
    /// `updated_at` is bumped when the returned guard is dropped, and only if
    /// the node was borrowed mutably through it. Read-only use leaves the
    /// timestamp alone.
    pub fn node_mut(&mut self, node_id: &NodeId) -> Option<NodeMut<'_>> {
        let node = find_node_mut(self.root.as_mut(), node_id)?;
        Some(NodeMut {
            node,
            updated_at: &mut self.updated_at,
            mutated: false,
        })
    }

    /// Look up a node anywhere in the tree.
    pub fn find_by_id(&self, node_id: &NodeId) -> Option<&Node> {
        self.iter().find(|node| node.id() == node_id)
    }

    /// Nodes from `node_id` up to the root, target first.
    ///
    /// Follows parent links. Returns `None` when the id is unknown.
    pub fn ancestry(&self, node_id: &NodeId) -> Option<Vec<&Node>> {
        let mut chain = Vec::new();
        let mut current = self.find_by_id(node_id);
        while let Some(node) = current {
            chain.push(node);
            current = match node.parent_id() {
                Some(parent_id) => Some(self.find_by_id(parent_id)?),
                None => None,
            };
        }
        if chain.is_empty() {
            None
        } else {
            Some(chain)
        }
    }

    /// Nodes from the root down to `node_id`, root first.
    pub fn conversation_path(&self, node_id: &NodeId) -> Option<Vec<&Node>> {
        let mut path = self.ancestry(node_id)?;
        path.reverse();
        Some(path)
    }

    /// Depth of a node, with the root at depth 1.
    pub fn depth_of(&self, node_id: &NodeId) -> Option<usize> {
        self.ancestry(node_id).map(|chain| chain.len())
    }

    /// Every node in pre-order.
    pub fn all_nodes(&self) -> Vec<&Node> {
        self.iter().collect()
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Maximum depth, with the root at depth 1 and an empty tree at 0.
    pub fn max_depth(&self) -> usize {
        let mut max = 0;
        let mut stack: Vec<(&Node, usize)> = self.root.iter().map(|root| (root, 1)).collect();
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(node.all_children().into_iter().map(|child| (child, depth + 1)));
        }
        max
    }

    /// Pre-order iterator over all nodes.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            stack: self.root.iter().collect(),
        }
    }

    /// Summary statistics.
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            tree_id: self.tree_id.clone(),
            node_count: self.node_count(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            has_root: self.root.is_some(),
            max_depth: self.max_depth(),
        }
    }

    /// Nested export mirroring the node and segment structure.
    pub fn export(&self) -> TreeExport {
        TreeExport::from(self)
    }

    /// Export as a JSON value.
    pub fn to_json(&self) -> AppResult<serde_json::Value> {
        Ok(serde_json::to_value(self.export())?)
    }

    /// Role-tagged transcript for `node_id` using default context settings.
    pub fn context(&self, node_id: &NodeId) -> TreeResult<Vec<Message>> {
        ContextBuilder::default().build(self, node_id)
    }

    fn require(&self, node_id: &NodeId) -> TreeResult<&Node> {
        self.find_by_id(node_id).ok_or_else(|| TreeError::NodeNotFound {
            node_id: node_id.to_string(),
        })
    }

    fn require_mut(&mut self, node_id: &NodeId) -> TreeResult<&mut Node> {
        let tree_id = self.tree_id.clone();
        find_node_mut(self.root.as_mut(), node_id).ok_or_else(|| {
            warn!(tree_id = %tree_id, node_id = %node_id, "Node not found");
            TreeError::NodeNotFound {
                node_id: node_id.to_string(),
            }
        })
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for ConversationTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tree(id={}, nodes={}, root={})",
            self.tree_id,
            self.node_count(),
            if self.root.is_some() { "Yes" } else { "No" }
        )
    }
}

fn find_node_mut<'a>(root: Option<&'a mut Node>, node_id: &NodeId) -> Option<&'a mut Node> {
    let mut stack: Vec<&mut Node> = root.into_iter().collect();
    while let Some(node) = stack.pop() {
        if node.id() == node_id {
            return Some(node);
        }
        stack.extend(node.all_children_mut());
    }
    None
}

/// Mutable handle to one node, returned by [`ConversationTree::node_mut`].
///
/// Dereferences to [`Node`]. Mutable dereferences mark the tree as changed.
pub struct NodeMut<'a> {
    node: &'a mut Node,
    updated_at: &'a mut DateTime<Utc>,
    mutated: bool,
}

impl Deref for NodeMut<'_> {
    type Target = Node;

    fn deref(&self) -> &Node {
        &*self.node
    }
}

impl DerefMut for NodeMut<'_> {
    fn deref_mut(&mut self) -> &mut Node {
        self.mutated = true;
        &mut *self.node
    }
}

impl Drop for NodeMut<'_> {
    fn drop(&mut self) {
        if self.mutated {
            *self.updated_at = Utc::now();
        }
    }
}

/// Pre-order traversal backed by an explicit stack.
pub struct PreOrder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.all_children().into_iter().rev());
        Some(node)
    }
}
