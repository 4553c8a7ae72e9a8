//! Equivalence engine: `is` and `is_type`.
//!
//! Two links are equivalent when, after following their marks, they are
//! the same instance or they have the same [`Signature`]. A signature is
//! built only from type keys and messages, which the wire codec always
//! preserves, so equivalence holds identically for local and decoded chains.

use std::any::{Any, TypeId};
use std::ptr;

use crate::mark::resolve_identity;
use crate::node::{ErrorNode, ErrorValue};
use crate::type_key::TypeKey;

/// Structural identity of a link: its `(type key, own message)` pair
/// followed by the pairs of each of its causes.
///
/// Including the causes keeps `wrap(a, "ctx")` distinct from
/// `wrap(b, "ctx")`. Marks on the causes are not part of the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    links: Vec<(TypeKey, String)>,
}

impl Signature {
    /// Compute the signature of `node` as given (marks are not resolved).
    pub fn of(node: &ErrorNode) -> Self {
        Self {
            links: node
                .chain()
                .map(|link| (link.type_key(), link.message()))
                .collect(),
        }
    }

    /// Returns the `(type key, message)` pairs, outermost first.
    pub fn links(&self) -> &[(TypeKey, String)] {
        &self.links
    }
}

/// Returns the signature of the identity `node` resolves to.
pub fn structural_signature(node: &ErrorNode) -> Signature {
    Signature::of(resolve_identity(node))
}

/// Whether one link of a chain matches an already-resolved target.
fn link_matches(link: &ErrorNode, target: &ErrorNode, target_signature: &Signature) -> bool {
    let resolved = resolve_identity(link);
    ptr::eq(resolved, target) || Signature::of(resolved) == *target_signature
}

/// Whether `err`, or any cause in its chain, is equivalent to `target`.
///
/// Only `err`'s chain is walked; `target` is a fixed point of comparison
/// (after resolving its mark). Two absent errors are equivalent; an
/// absent and a present one are not.
///
/// # Example
///
/// ```rust
/// use errmark_core::{is, ErrorNode};
///
/// let sentinel = ErrorNode::leaf("range not found");
/// let err = ErrorNode::leaf("range not found").wrap("lookup failed");
///
/// assert!(is(Some(&err), Some(&sentinel)));
/// assert!(!is(Some(&sentinel), Some(&err)));
/// assert!(is(None, None));
/// ```
pub fn is(err: Option<&ErrorNode>, target: Option<&ErrorNode>) -> bool {
    match (err, target) {
        (None, None) => true,
        (Some(err), Some(target)) => err.is(target),
        _ => false,
    }
}

impl ErrorNode {
    /// Method form of [`is`] for present errors.
    pub fn is(&self, target: &ErrorNode) -> bool {
        let target = resolve_identity(target);
        let target_signature = Signature::of(target);
        self.chain()
            .any(|link| link_matches(link, target, &target_signature))
    }
}

/// Whether any link in `err`'s chain holds a value of exactly type `T`.
///
/// Messages and marks are irrelevant.
pub fn is_type<T: ErrorValue>(err: Option<&ErrorNode>) -> bool {
    is_type_id(err, Some(TypeId::of::<T>()))
}

/// Like [`is_type`] with a runtime sample. An absent sample matches
/// nothing, and an absent error contains no types.
pub fn is_type_id(err: Option<&ErrorNode>, sample: Option<TypeId>) -> bool {
    let (Some(err), Some(sample)) = (err, sample) else {
        return false;
    };
    err.chain()
        .any(|link| Any::type_id(link.value().as_any()) == sample)
}
