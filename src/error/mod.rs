use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid configuration value
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong, naming the offending variable
        message: String,
    },

    /// Tree operation failed
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    /// JSON serialization failed
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Conversation tree errors.
///
/// Every variant is raised before any mutation happens, so a failed call
/// leaves the tree exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Segment-scoped branch requested at an index the response lacks
    #[error("Segment index {index} is out of range (segments: {count})")]
    SegmentOutOfRange {
        /// Requested segment index
        index: usize,
        /// Number of segments the node has
        count: usize,
    },

    /// Root creation attempted on a tree that already has one
    #[error("Tree already has a root node: {root_id}")]
    RootAlreadyExists {
        /// Id of the existing root
        root_id: String,
    },

    /// No node with the given id in the tree
    #[error("Node not found: {node_id}")]
    NodeNotFound {
        /// Id that was looked up
        node_id: String,
    },
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for tree operations
pub type TreeResult<T> = Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config {
            message: "bad entry order".to_string(),
        };
        assert_eq!(err.to_string(), "Configuration error: bad entry order");
    }

    #[test]
    fn test_tree_error_display() {
        let err = TreeError::SegmentOutOfRange { index: 5, count: 3 };
        assert_eq!(
            err.to_string(),
            "Segment index 5 is out of range (segments: 3)"
        );

        let err = TreeError::RootAlreadyExists {
            root_id: "root-1".to_string(),
        };
        assert_eq!(err.to_string(), "Tree already has a root node: root-1");

        let err = TreeError::NodeNotFound {
            node_id: "node-9".to_string(),
        };
        assert_eq!(err.to_string(), "Node not found: node-9");
    }

    #[test]
    fn test_tree_error_conversion_to_app_error() {
        let tree_err = TreeError::SegmentOutOfRange { index: 1, count: 0 };
        let app_err: AppError = tree_err.clone().into();
        assert!(matches!(app_err, AppError::Tree(ref e) if *e == tree_err));
        assert!(app_err.to_string().contains("out of range"));
    }

    #[test]
    fn test_json_error_conversion_to_app_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let app_err: AppError = json_err.into();
        assert!(matches!(app_err, AppError::Json(_)));
    }
}
