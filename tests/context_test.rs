//! Integration tests for context reconstruction.
//!
//! Covers the running "before first user" flag across ancestors, per-node
//! entry ordering and the sample Python conversation.

use pretty_assertions::assert_eq;

use chat_branch_tree::cli::sample_conversation;
use chat_branch_tree::context::{ContextBuilder, EntryOrder, Message, MessageRole};
use chat_branch_tree::tree::{ConversationTree, NodeId};

/// Root -> general child -> segment-scoped grandchild.
fn create_three_level_tree() -> (ConversationTree, NodeId, NodeId, NodeId) {
    let mut tree = ConversationTree::new();
    let root = tree
        .create_root("Tell me a story.", "Once upon a time.\nThe end.")
        .unwrap()
        .id()
        .clone();
    let child = tree
        .add_child(&root, "Hello! Who is the hero?", "A fox.")
        .unwrap()
        .id()
        .clone();
    let grandchild = tree
        .add_segment_child(&child, 0, "Make it shorter.", "Fox wins.")
        .unwrap()
        .id()
        .clone();
    (tree, root, child, grandchild)
}

#[test]
fn test_sample_conversation_context() {
    let (tree, follow_up) = sample_conversation().unwrap();
    let context = tree.context(&follow_up).unwrap();

    assert_eq!(
        context,
        vec![
            Message::user("Tell me about Python programming."),
            Message::assistant(
                "Python is a high-level programming language.\n\n\nIt's known for its simple syntax and readability.\n\nPython supports multiple programming paradigms."
            ),
            Message::system("You are an assistant."),
            Message::user("What makes Python's syntax simple?"),
            Message::assistant("Python's syntax is simple because it uses indentation..."),
        ]
    );
}

#[test]
fn test_running_flag_spans_ancestors() {
    let (tree, _, _, grandchild) = create_three_level_tree();
    let context = tree.context(&grandchild).unwrap();

    // Target first: "Make it shorter." is an imperative (system) and does not
    // clear the flag. In the child, "Hello!" is a greeting, so it is user and
    // clears the flag. The root's "Tell me a story." then falls to user.
    assert_eq!(
        context,
        vec![
            Message::user("Tell me a story."),
            Message::assistant("Once upon a time.\nThe end."),
            Message::user("Hello!"),
            Message::user("Who is the hero?"),
            Message::assistant("A fox."),
            Message::system("Make it shorter."),
            Message::assistant("Fox wins."),
        ]
    );
}

#[test]
fn test_positional_rule_applies_until_first_user() {
    let mut tree = ConversationTree::new();
    let root = tree
        .create_root("Tell me about Go.", "Go is compiled.")
        .unwrap()
        .id()
        .clone();
    let child = tree
        .add_child(&root, "Summarize it.", "Fast builds.")
        .unwrap()
        .id()
        .clone();

    // No unit anywhere reads as a user turn, so every unit stays system.
    let roles: Vec<MessageRole> = tree
        .context(&child)
        .unwrap()
        .into_iter()
        .map(|m| m.role)
        .collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::System,
            MessageRole::Assistant,
            MessageRole::System,
            MessageRole::Assistant,
        ]
    );
}

#[test]
fn test_assistant_first_ordering() {
    let (tree, _, child, _) = create_three_level_tree();
    let context = ContextBuilder::new()
        .with_entry_order(EntryOrder::AssistantFirst)
        .build(&tree, &child)
        .unwrap();

    assert_eq!(
        context,
        vec![
            Message::assistant("Once upon a time.\nThe end."),
            Message::user("Tell me a story."),
            Message::assistant("A fox."),
            Message::user("Hello!"),
            Message::user("Who is the hero?"),
        ]
    );
}

#[test]
fn test_context_for_root_ignores_descendants() {
    let (tree, root, _, _) = create_three_level_tree();
    let context = tree.context(&root).unwrap();
    assert_eq!(
        context,
        vec![
            Message::system("Tell me a story."),
            Message::assistant("Once upon a time.\nThe end."),
        ]
    );
}

#[test]
fn test_context_serializes_as_message_list() {
    let (tree, _, child, _) = create_three_level_tree();
    let value = serde_json::to_value(tree.context(&child).unwrap()).unwrap();
    assert_eq!(value[0]["role"], "user");
    assert_eq!(value[1]["role"], "assistant");
}
