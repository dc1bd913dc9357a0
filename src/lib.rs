//! # Chat Branch Tree
//!
//! Branching conversation trees for LLM chat front-ends. Each node holds one
//! user message and the assistant response it produced; the response is
//! split into line segments, and follow-up questions can branch from a whole
//! node or from a single segment.
//!
//! ## Features
//!
//! - **Segmentation**: responses split into trimmed, non-blank, indexed lines
//! - **Branching**: general follow-ups and segment-scoped follow-ups
//! - **Role Classification**: ordered heuristics tagging message fragments as
//!   system instructions or user turns
//! - **Context Reconstruction**: role-tagged transcript from the root down to
//!   any node, ready for a chat-completion message list
//! - **Tree Index**: id lookup, paths, depth, statistics and nested export
//!
//! ## Architecture
//!
//! ```text
//! ConversationTree ─ owns → Node ─ owns → Segment ─ owns → Node ...
//!        │                   └──── owns → Node (general children)
//!        └→ ContextBuilder → classifier → Vec<Message>
//! ```
//!
//! ## Example
//!
//! ```
//! use chat_branch_tree::{ConversationTree, MessageRole};
//!
//! let mut tree = ConversationTree::new();
//! let root = tree
//!     .create_root("Tell me about Rust.", "Rust is fast.\n\nRust is safe.")
//!     .unwrap()
//!     .id()
//!     .clone();
//! let follow_up = tree
//!     .add_segment_child(&root, 1, "How is it safe?", "Ownership and borrowing.")
//!     .unwrap()
//!     .id()
//!     .clone();
//!
//! let context = tree.context(&follow_up).unwrap();
//! assert_eq!(context.last().unwrap().role, MessageRole::Assistant);
//! ```

#![warn(missing_docs)]

/// Role classification heuristics for message fragments.
pub mod classifier;
/// CLI command implementations.
pub mod cli;
/// Configuration management.
pub mod config;
/// Context (transcript) reconstruction.
pub mod context;
/// Error types and result aliases for the application.
pub mod error;
/// Conversation tree entity model, branching and index queries.
pub mod tree;

pub use classifier::{classify, SpeakerRole};
pub use config::Config;
pub use context::{ContextBuilder, EntryOrder, Message, MessageRole};
pub use error::{AppError, AppResult, TreeError, TreeResult};
pub use tree::{ConversationTree, Node, NodeId, Segment, SharedTree};
