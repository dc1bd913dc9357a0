//! Lock-guarded tree handle for concurrent callers.
//!
//! Mutations hold the write lock across their whole validate-then-append
//! sequence, so a segment index checked by `add_segment_child` cannot go
//! stale before the append. Reads share the read lock.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};

use super::{ConversationTree, Node, NodeId, TreeExport, TreeStats};
use crate::context::{ContextBuilder, Message};
use crate::error::TreeResult;

/// Cloneable, shareable handle to a [`ConversationTree`].
#[derive(Clone, Default)]
pub struct SharedTree {
    inner: Arc<RwLock<ConversationTree>>,
}

impl SharedTree {
    /// Wrap an existing tree.
    pub fn new(tree: ConversationTree) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Create the root node.
    pub async fn create_root(
        &self,
        message: impl Into<String>,
        response: impl Into<String>,
    ) -> TreeResult<NodeId> {
        let mut tree = self.inner.write().await;
        Ok(tree.create_root(message, response)?.id().clone())
    }

    /// Append a general child.
    pub async fn add_child(
        &self,
        parent_id: &NodeId,
        message: impl Into<String>,
        response: impl Into<String>,
    ) -> TreeResult<NodeId> {
        let mut tree = self.inner.write().await;
        Ok(tree.add_child(parent_id, message, response)?.id().clone())
    }

    /// Append a segment-scoped child.
    pub async fn add_segment_child(
        &self,
        parent_id: &NodeId,
        segment_index: usize,
        message: impl Into<String>,
        response: impl Into<String>,
    ) -> TreeResult<NodeId> {
        let mut tree = self.inner.write().await;
        Ok(tree
            .add_segment_child(parent_id, segment_index, message, response)?
            .id()
            .clone())
    }

    /// Replace a node's response.
    pub async fn set_response(
        &self,
        node_id: &NodeId,
        response: impl Into<String>,
    ) -> TreeResult<()> {
        let mut tree = self.inner.write().await;
        tree.set_response(node_id, response)?;
        Ok(())
    }

    /// Snapshot of a node and its subtree.
    pub async fn find_by_id(&self, node_id: &NodeId) -> Option<Node> {
        self.inner.read().await.find_by_id(node_id).cloned()
    }

    /// Transcript for `node_id`.
    pub async fn context(
        &self,
        builder: &ContextBuilder,
        node_id: &NodeId,
    ) -> TreeResult<Vec<Message>> {
        let tree = self.inner.read().await;
        builder.build(&tree, node_id)
    }

    /// Summary statistics.
    pub async fn stats(&self) -> TreeStats {
        self.inner.read().await.stats()
    }

    /// Nested export.
    pub async fn export(&self) -> TreeExport {
        self.inner.read().await.export()
    }

    /// Hold the read lock for a batch of queries.
    pub async fn read(&self) -> RwLockReadGuard<'_, ConversationTree> {
        self.inner.read().await
    }
}
