//! Serializable snapshots of a tree for downstream storage or transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ConversationTree, Node, Segment};

/// Summary statistics for a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Tree identifier.
    pub tree_id: String,
    /// Total nodes, segment-scoped ones included.
    pub node_count: usize,
    /// When the tree was created.
    pub created_at: DateTime<Utc>,
    /// When the tree was last mutated.
    pub updated_at: DateTime<Utc>,
    /// Whether a root node exists.
    pub has_root: bool,
    /// Maximum depth (root = 1, empty = 0).
    pub max_depth: usize,
}

/// Nested export of a whole tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeExport {
    /// Tree identifier.
    pub tree_id: String,
    /// When the tree was created.
    pub created_at: DateTime<Utc>,
    /// When the tree was last mutated.
    pub updated_at: DateTime<Utc>,
    /// Total nodes at export time.
    pub node_count: usize,
    /// The root node, if any.
    pub root_node: Option<NodeExport>,
}

/// Exported node with its branches inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeExport {
    /// Node identifier.
    pub id: String,
    /// Parent identifier; absent for the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// User message.
    pub message: String,
    /// Assistant response.
    pub response: String,
    /// General children.
    pub children: Vec<NodeExport>,
    /// Response segments with their scoped children.
    pub response_segments: Vec<SegmentExport>,
}

/// Exported segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentExport {
    /// Trimmed line text.
    pub content: String,
    /// Position among non-blank lines.
    pub index: usize,
    /// Segment-scoped children.
    pub children: Vec<NodeExport>,
}

impl From<&Node> for NodeExport {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id().to_string(),
            parent_id: node.parent_id().map(ToString::to_string),
            message: node.message().to_string(),
            response: node.response().to_string(),
            children: node.children().iter().map(NodeExport::from).collect(),
            response_segments: node.segments().iter().map(SegmentExport::from).collect(),
        }
    }
}

impl From<&Segment> for SegmentExport {
    fn from(segment: &Segment) -> Self {
        Self {
            content: segment.content().to_string(),
            index: segment.index(),
            children: segment.children().iter().map(NodeExport::from).collect(),
        }
    }
}

impl From<&ConversationTree> for TreeExport {
    fn from(tree: &ConversationTree) -> Self {
        Self {
            tree_id: tree.tree_id().to_string(),
            created_at: tree.created_at(),
            updated_at: tree.updated_at(),
            node_count: tree.node_count(),
            root_node: tree.root().map(NodeExport::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_export_mirrors_structure() {
        let mut tree = ConversationTree::with_id("export-tree");
        let root_id = tree
            .create_root("Hi", "Line one\n\nLine two")
            .unwrap()
            .id()
            .clone();
        tree.add_segment_child(&root_id, 1, "About two?", "Two.")
            .unwrap();
        tree.add_child(&root_id, "General?", "Yes.").unwrap();

        let export = tree.export();
        assert_eq!(export.tree_id, "export-tree");
        assert_eq!(export.node_count, 3);

        let root = export.root_node.unwrap();
        assert_eq!(root.id, root_id.to_string());
        assert!(root.parent_id.is_none());
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.response_segments.len(), 2);
        assert!(root.response_segments[0].children.is_empty());
        assert_eq!(root.response_segments[1].index, 1);
        assert_eq!(root.response_segments[1].content, "Line two");

        let scoped = &root.response_segments[1].children[0];
        assert_eq!(scoped.message, "About two?");
        assert_eq!(scoped.parent_id.as_deref(), Some(root_id.as_str()));
    }

    #[test]
    fn test_empty_tree_exports_null_root() {
        let tree = ConversationTree::with_id("empty");
        let value = tree.to_json().unwrap();
        assert_eq!(value["root_node"], json!(null));
        assert_eq!(value["node_count"], json!(0));
    }

    #[test]
    fn test_json_omits_root_parent() {
        let mut tree = ConversationTree::new();
        tree.create_root("m", "r").unwrap();
        let value = tree.to_json().unwrap();
        assert!(value["root_node"].get("parent_id").is_none());
        assert_eq!(value["root_node"]["response_segments"][0]["content"], json!("r"));
    }
}
