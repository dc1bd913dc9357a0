//! Segmentation engine: splits an assistant response into branchable lines.

use super::Node;

/// One non-blank line of a response, independently branchable.
#[derive(Debug, Clone)]
pub struct Segment {
    /// The trimmed line text.
    pub(crate) content: String,
    /// Zero-based position among the non-blank lines of the response.
    pub(crate) index: usize,
    /// Follow-up nodes scoped to this segment.
    pub(crate) children: Vec<Node>,
}

impl Segment {
    pub(crate) fn new(index: usize, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            index,
            children: Vec::new(),
        }
    }

    /// The trimmed line text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Position among the non-blank lines of the owning response.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Follow-up nodes attached to this segment, in insertion order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }
}

impl PartialEq for Segment {
    /// Segments compare by content and position; attached branches are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.content == other.content
    }
}

/// Split a response into ordered segments.
///
/// Lines are trimmed and blank lines dropped entirely, so any run of empty
/// lines between two paragraphs yields no segment at all. Surviving lines are
/// numbered `0..k` in original order. The result depends only on `response`.
pub fn segment_response(response: &str) -> Vec<Segment> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(index, line)| Segment::new(index, line))
        .collect()
}
