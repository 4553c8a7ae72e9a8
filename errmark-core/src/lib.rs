//! # errmark core
//!
//! **Portable error identity for distributed programs**
//!
//! Errors raised on one node often have to be recognized on another:
//! a caller wants to ask "is this the range-not-found error?" about an
//! error that was produced in a different process, by a binary that may
//! know a different set of error types. This crate gives error chains an
//! identity that survives that trip.
//!
//! ## Features
//!
//! - **Structural equivalence**: [`is`] compares links by type key and
//!   message, walking the cause chain of the error under test
//! - **Marks**: [`mark`] overrides the identity of a link without touching
//!   its message or causes
//! - **Portable encoding**: [`Codec`] turns a chain into a self-describing
//!   [`PortableRecord`] tree and back, keeping identity even for types the
//!   receiver never registered
//! - **Formatting**: simple (`{}`) and verbose (`{:#}`) rendering
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use errmark_core::{is, mark, Codec, CodecConfig, ErrorNode, Registry};
//!
//! // Build the registry once at startup.
//! let codec = Codec::new(Arc::new(Registry::with_builtins()), CodecConfig::default());
//!
//! // A sentinel shared by every node of the cluster.
//! let ambiguous = Arc::new(ErrorNode::leaf("result is ambiguous"));
//!
//! // Remote side: some failure, marked as ambiguous, wrapped with context.
//! let err = mark(ErrorNode::leaf("connection reset"), ambiguous.clone()).wrap("commit");
//! let bytes = codec.encode_to_bytes(&err).unwrap();
//!
//! // Local side: the decoded chain still matches the sentinel.
//! let received = codec.decode_from_bytes(&bytes).unwrap();
//! assert!(is(Some(&received), Some(&*ambiguous)));
//! assert_eq!(received.to_string(), "commit: connection reset");
//! ```

pub mod codec;
pub mod config;
pub mod equivalence;
pub mod error;
pub mod format;
pub mod mark;
pub mod node;
pub mod registry;
pub mod type_key;

// Re-export main types for convenience
pub use codec::{Codec, Opaque, PortableRecord};
pub use config::CodecConfig;
pub use equivalence::{is, is_type, is_type_id, structural_signature, Signature};
pub use error::{MarkError, Result};
pub use mark::{mark, resolve_identity};
pub use node::{AsAny, Chain, Context, ErrorNode, ErrorValue, FormatDetail, Message};
pub use registry::{DecodeFn, EncodeFn, Registry, RegistryBuilder, RegistryEntry};
pub use type_key::TypeKey;
