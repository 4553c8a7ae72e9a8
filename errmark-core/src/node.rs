//! Error chain model.
//!
//! An [`ErrorNode`] is one link of a chain: a concrete [`ErrorValue`]
//! carrying the link's own message, an optional exclusively-owned cause,
//! and an optional mark used only for identity comparison.
//!
//! Nodes are immutable once built and can only point at nodes that were
//! built before them, so every chain is finite and acyclic by construction.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::type_key::TypeKey;

/// Access to a value as `&dyn Any`, implemented for every `'static` type.
pub trait AsAny: Any {
    /// Returns `self` as a `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The concrete value held by one link of an error chain.
///
/// `Display` must render the link's *own* message only, without the
/// messages of its causes.
///
/// # Example
///
/// ```rust
/// use std::fmt;
/// use errmark_core::{ErrorNode, ErrorValue};
///
/// #[derive(Debug)]
/// struct NotLeader {
///     range_id: u64,
/// }
///
/// impl fmt::Display for NotLeader {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "not leader for range {}", self.range_id)
///     }
/// }
///
/// impl ErrorValue for NotLeader {}
///
/// let err = ErrorNode::new(NotLeader { range_id: 7 }).wrap("send failed");
/// assert_eq!(err.to_string(), "send failed: not leader for range 7");
/// ```
pub trait ErrorValue: fmt::Display + fmt::Debug + Send + Sync + AsAny {
    /// Identity of this value's concrete type.
    ///
    /// Overrides must stay consistent with the key the type is registered under.
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }

    /// Detail capability: `Some` when the value renders extra verbose text.
    fn detail(&self) -> Option<&dyn FormatDetail> {
        None
    }
}

/// Extra text shown below a link's message in verbose rendering.
pub trait FormatDetail {
    /// Write the detail text. Multi-line output is indented by the renderer.
    fn format_detail(&self, out: &mut dyn fmt::Write) -> fmt::Result;
}

/// Built-in leaf value: a bare message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message(pub String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl ErrorValue for Message {}

/// Built-in wrapper value: context prepended to a cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context(pub String);

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl ErrorValue for Context {}

/// One link of an error chain.
pub struct ErrorNode {
    value: Box<dyn ErrorValue>,
    cause: Option<Box<ErrorNode>>,
    mark: Option<Arc<ErrorNode>>,
}

impl ErrorNode {
    /// Create a leaf from a concrete value.
    pub fn new(value: impl ErrorValue) -> Self {
        Self::from_parts(Box::new(value), None, None)
    }

    /// Create a wrapper around `cause`.
    pub fn with_cause(value: impl ErrorValue, cause: ErrorNode) -> Self {
        Self::from_parts(Box::new(value), Some(cause), None)
    }

    /// Create a leaf holding a [`Message`].
    pub fn leaf(message: impl Into<String>) -> Self {
        Self::new(Message(message.into()))
    }

    /// Wrap this chain with a [`Context`] message.
    pub fn wrap(self, message: impl Into<String>) -> Self {
        Self::with_cause(Context(message.into()), self)
    }

    pub(crate) fn from_parts(
        value: Box<dyn ErrorValue>,
        cause: Option<ErrorNode>,
        mark: Option<Arc<ErrorNode>>,
    ) -> Self {
        Self {
            value,
            cause: cause.map(Box::new),
            mark,
        }
    }

    pub(crate) fn set_mark(&mut self, mark: Arc<ErrorNode>) {
        self.mark = Some(mark);
    }

    /// Returns the concrete value of this link.
    #[inline]
    pub fn value(&self) -> &dyn ErrorValue {
        &*self.value
    }

    /// Returns this link's own message (causes excluded).
    pub fn message(&self) -> String {
        self.value.to_string()
    }

    /// Returns the type key of this link's value.
    pub fn type_key(&self) -> TypeKey {
        self.value.type_key()
    }

    /// Returns the direct cause, if any.
    #[inline]
    pub fn cause(&self) -> Option<&ErrorNode> {
        self.cause.as_deref()
    }

    /// Returns the mark attached to this link, if any.
    #[inline]
    pub fn mark(&self) -> Option<&Arc<ErrorNode>> {
        self.mark.as_ref()
    }

    /// Iterate the chain from this link to the innermost cause.
    ///
    /// Marks are not visited.
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// Returns the innermost link of the chain.
    pub fn root_cause(&self) -> &ErrorNode {
        let mut node = self;
        while let Some(cause) = node.cause() {
            node = cause;
        }
        node
    }

    /// Returns this link's value as `T` if it has exactly that type.
    pub fn downcast_ref<T: ErrorValue>(&self) -> Option<&T> {
        self.value().as_any().downcast_ref::<T>()
    }
}

impl std::error::Error for ErrorNode {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Iterator over the links of a chain, outermost first.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    next: Option<&'a ErrorNode>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a ErrorNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.cause();
        Some(node)
    }
}
