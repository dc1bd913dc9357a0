//! CLI commands for inspecting segmentation, classification and context.

use std::io::Read;

use clap::Subcommand;

use crate::classifier::classify_detailed;
use crate::config::Config;
use crate::context::ContextBuilder;
use crate::error::AppResult;
use crate::tree::{segment_response, ConversationTree, NodeId};

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Classify a message fragment as system or user
    Classify {
        /// Text to classify
        text: String,

        /// Treat the fragment as preceding any user turn
        #[arg(long)]
        before_first_user: bool,
    },

    /// Split a response into indexed segments (reads stdin when TEXT is absent)
    Segment {
        /// Response text
        text: Option<String>,
    },

    /// Build the sample conversation and print its context
    Demo {
        /// Print the tree export and context as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Result of CLI command execution.
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output message
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }
}

/// Execute a CLI command.
pub fn execute_command(command: Commands, config: &Config) -> CliResult {
    match command {
        Commands::Classify {
            text,
            before_first_user,
        } => execute_classify(&text, before_first_user),
        Commands::Segment { text } => match text {
            Some(text) => execute_segment(&text),
            None => {
                let mut input = String::new();
                match std::io::stdin().read_to_string(&mut input) {
                    Ok(_) => execute_segment(&input),
                    Err(e) => CliResult::error(format!("Failed to read stdin: {}", e)),
                }
            }
        },
        Commands::Demo { json } => match execute_demo(config, json) {
            Ok(output) => CliResult::success(output),
            Err(e) => CliResult::error(format!("Demo failed: {}", e)),
        },
    }
}

fn execute_classify(text: &str, before_first_user: bool) -> CliResult {
    let classification = classify_detailed(text, before_first_user);
    let rule = classification
        .rule
        .map(|r| r.to_string())
        .unwrap_or_else(|| "none".to_string());
    CliResult::success(format!("{} (rule: {})", classification.role, rule))
}

fn execute_segment(text: &str) -> CliResult {
    let segments = segment_response(text);
    if segments.is_empty() {
        return CliResult::success("No segments");
    }
    let output = segments
        .iter()
        .map(|s| format!("[{}] {}", s.index(), s.content()))
        .collect::<Vec<_>>()
        .join("\n");
    CliResult::success(output)
}

/// Sample conversation: a Python overview with one segment-scoped and one
/// general follow-up. Returns the tree and the id of the scoped follow-up.
pub fn sample_conversation() -> AppResult<(ConversationTree, NodeId)> {
    let mut tree = ConversationTree::new();
    let root_id = tree
        .create_root(
            "Tell me about Python programming.",
            "Python is a high-level programming language.\n\n\nIt's known for its simple syntax and readability.\n\nPython supports multiple programming paradigms.",
        )?
        .id()
        .clone();

    let follow_up = tree
        .add_segment_child(
            &root_id,
            1,
            "You are an assistant. What makes Python's syntax simple?",
            "Python's syntax is simple because it uses indentation...",
        )?
        .id()
        .clone();

    tree.add_child(
        &root_id,
        "What version of Python should I use?",
        "Python 3.x is recommended...",
    )?;

    Ok((tree, follow_up))
}

fn execute_demo(config: &Config, json: bool) -> AppResult<String> {
    let (tree, follow_up) = sample_conversation()?;
    let context = ContextBuilder::from_config(&config.context).build(&tree, &follow_up)?;

    if json {
        let output = serde_json::json!({
            "stats": tree.stats(),
            "tree": tree.export(),
            "context": context,
        });
        return Ok(serde_json::to_string_pretty(&output)?);
    }

    let mut output = String::new();
    let stats = tree.stats();
    output.push_str(&format!(
        "Tree {} ({} nodes, max depth {})\n\n",
        stats.tree_id, stats.node_count, stats.max_depth
    ));

    if let Some(root) = tree.root() {
        output.push_str(&format!("{}\n", root));
        for segment in root.segments() {
            output.push_str(&format!(
                "  [{}] {} ({} follow-ups)\n",
                segment.index(),
                segment.content(),
                segment.children().len()
            ));
        }
    }

    output.push_str("\nContext for the segment follow-up:\n");
    for message in &context {
        output.push_str(&format!("  {:<9} {}\n", message.role.to_string(), message.content));
    }
    Ok(output)
}
