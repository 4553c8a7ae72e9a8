//! Identity overrides ("marks").
//!
//! A mark is an ordinary error chain attached to a link purely for
//! comparison: once marked, the link is compared as if it were the mark.
//! The link's message, cause and rendering in simple mode are untouched.

use std::sync::Arc;

use crate::node::ErrorNode;

/// Attach `mark` to `node`, returning the marked node.
///
/// The same `Arc` may be used to mark many nodes; they then compare equal
/// to each other and to the mark itself. A mark already present on `node`
/// is replaced.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use errmark_core::{is, mark, ErrorNode};
///
/// let retryable = Arc::new(ErrorNode::leaf("retryable"));
/// let a = mark(ErrorNode::leaf("connection reset"), retryable.clone());
/// let b = mark(ErrorNode::leaf("deadline exceeded"), retryable.clone());
///
/// assert!(is(Some(&a), Some(&b)));
/// assert!(is(Some(&a), Some(&*retryable)));
/// assert_eq!(a.to_string(), "connection reset");
/// ```
pub fn mark(node: ErrorNode, mark: impl Into<Arc<ErrorNode>>) -> ErrorNode {
    node.marked(mark)
}

impl ErrorNode {
    /// Method form of [`mark`].
    pub fn marked(mut self, mark: impl Into<Arc<ErrorNode>>) -> Self {
        self.set_mark(mark.into());
        self
    }
}

/// Follow mark edges from `node` to the link whose identity it carries.
///
/// Marks may nest: a mark that is itself marked resolves further.
pub fn resolve_identity(node: &ErrorNode) -> &ErrorNode {
    let mut current = node;
    while let Some(mark) = current.mark() {
        current = mark;
    }
    current
}
