//! Portable encoding of error chains.
//!
//! [`Codec::encode_chain`] turns a chain into a [`PortableRecord`] tree and
//! [`Codec::decode_chain`] rebuilds it on the other side. Every record keeps
//! the type key and message of its link whether or not the type is
//! registered; only the structured payload depends on the registry. A
//! record whose type has no decoder becomes an [`Opaque`] value that keeps
//! comparing, rendering and re-encoding exactly like the original.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use errmark_core::{Codec, CodecConfig, ErrorNode, Registry};
//!
//! let codec = Codec::new(Arc::new(Registry::with_builtins()), CodecConfig::default());
//!
//! let err = ErrorNode::leaf("range not found").wrap("lookup failed");
//! let bytes = codec.encode_to_bytes(&err).unwrap();
//!
//! // ... bytes cross the transport ...
//!
//! let decoded = codec.decode_from_bytes(&bytes).unwrap();
//! assert_eq!(decoded.to_string(), "lookup failed: range not found");
//! assert!(decoded.is(&err) && err.is(&decoded));
//! ```

use std::fmt;
use std::sync::Arc;

use bincode::Options;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::CodecConfig;
use crate::error::{MarkError, Result};
use crate::format::render_detail;
use crate::node::{ErrorNode, ErrorValue, FormatDetail};
use crate::registry::Registry;
use crate::type_key::TypeKey;

/// Wire form of one link and, recursively, its mark and cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortableRecord {
    /// Type key of the link's value
    pub type_key: TypeKey,

    /// The link's own message
    pub message: String,

    /// Type-specific payload; empty when the type is not registered
    pub payload: Vec<u8>,

    /// Verbose detail text rendered at encode time
    pub detail: Option<String>,

    /// Encoded mark chain
    pub mark: Option<Box<PortableRecord>>,

    /// Encoded cause chain
    pub cause: Option<Box<PortableRecord>>,
}

impl PortableRecord {
    /// Serialize this record tree to compact binary format.
    ///
    /// The byte form is a flat list of records in breadth-first order,
    /// root first, where `mark` and `cause` are indices of later entries.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::DefaultOptions::new()
            .serialize(&self.flatten())
            .map_err(|e| MarkError::Serialization(e.to_string()))
    }

    /// Deserialize a record tree from binary format with the default limits.
    ///
    /// # Errors
    ///
    /// Returns `MarkError::Serialization` if the data is malformed and
    /// `MarkError::DepthExceeded` if the tree nests too deeply.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with(data, &CodecConfig::default())
    }

    /// Deserialize a record tree, enforcing `config.max_bytes` on the input
    /// and `config.max_depth` on the rebuilt tree.
    pub fn from_bytes_with(data: &[u8], config: &CodecConfig) -> Result<Self> {
        let flat: Vec<WireRecord> = bincode::DefaultOptions::new()
            .with_limit(config.max_bytes)
            .deserialize(data)
            .map_err(|e| MarkError::Serialization(e.to_string()))?;
        unflatten(flat, config.max_depth)
    }

    /// Number of records on the longest path through cause and mark edges.
    pub fn depth(&self) -> usize {
        let mark = self.mark.as_deref().map_or(0, PortableRecord::depth);
        let cause = self.cause.as_deref().map_or(0, PortableRecord::depth);
        1 + mark.max(cause)
    }

    fn flatten(&self) -> Vec<WireRecord> {
        let mut pending: Vec<&PortableRecord> = vec![self];
        let mut flat = Vec::new();
        let mut next = 0;
        while next < pending.len() {
            let record = pending[next];
            next += 1;
            let mark = record.mark.as_deref().map(|mark| {
                pending.push(mark);
                pending.len() - 1
            });
            let cause = record.cause.as_deref().map(|cause| {
                pending.push(cause);
                pending.len() - 1
            });
            flat.push(WireRecord {
                type_key: record.type_key.clone(),
                message: record.message.clone(),
                payload: record.payload.clone(),
                detail: record.detail.clone(),
                mark,
                cause,
            });
        }
        flat
    }
}

/// One entry of the flat byte form.
#[derive(Serialize, Deserialize)]
struct WireRecord {
    type_key: TypeKey,
    message: String,
    payload: Vec<u8>,
    detail: Option<String>,
    mark: Option<usize>,
    cause: Option<usize>,
}

/// Rebuild a record tree from its flat form without recursion.
///
/// Every reference must point to a later entry and every entry except the
/// root must be referenced exactly once, so the result is a finite tree.
fn unflatten(mut flat: Vec<WireRecord>, max_depth: usize) -> Result<PortableRecord> {
    if flat.is_empty() {
        return Err(MarkError::Serialization("empty record list".into()));
    }

    let len = flat.len();
    let mut built: Vec<Option<(PortableRecord, usize)>> = (0..len).map(|_| None).collect();
    for index in (0..len).rev() {
        let Some(wire) = flat.pop() else {
            break;
        };
        let mark = take_child(&mut built, index, wire.mark)?;
        let cause = take_child(&mut built, index, wire.cause)?;

        let depth = 1 + mark
            .as_ref()
            .map_or(0, |(_, d)| *d)
            .max(cause.as_ref().map_or(0, |(_, d)| *d));
        if depth > max_depth {
            warn!("Received error chain exceeds max depth {}", max_depth);
            return Err(MarkError::DepthExceeded { limit: max_depth });
        }

        let record = PortableRecord {
            type_key: wire.type_key,
            message: wire.message,
            payload: wire.payload,
            detail: wire.detail,
            mark: mark.map(|(record, _)| Box::new(record)),
            cause: cause.map(|(record, _)| Box::new(record)),
        };
        built[index] = Some((record, depth));
    }

    if built[1..].iter().any(Option::is_some) {
        return Err(MarkError::Serialization("unreferenced record in list".into()));
    }
    built[0]
        .take()
        .map(|(record, _)| record)
        .ok_or_else(|| MarkError::Serialization("missing root record".into()))
}

fn take_child(
    built: &mut [Option<(PortableRecord, usize)>],
    parent: usize,
    child: Option<usize>,
) -> Result<Option<(PortableRecord, usize)>> {
    let Some(child) = child else {
        return Ok(None);
    };
    if child <= parent || child >= built.len() {
        return Err(MarkError::Serialization(format!(
            "record {} references invalid index {}",
            parent, child
        )));
    }
    built[child]
        .take()
        .map(Some)
        .ok_or_else(|| MarkError::Serialization(format!("record {} referenced twice", child)))
}

/// A decoded value whose concrete type is not known locally.
///
/// It reports the original type key, message and detail, and keeps the
/// original payload so that re-encoding forwards it unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opaque {
    type_key: TypeKey,
    message: String,
    detail: Option<String>,
    payload: Vec<u8>,
}

impl Opaque {
    fn from_record(record: &PortableRecord) -> Self {
        Self {
            type_key: record.type_key.clone(),
            message: record.message.clone(),
            detail: record.detail.clone(),
            payload: record.payload.clone(),
        }
    }

    /// Returns the payload received with this value.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

impl fmt::Display for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl FormatDetail for Opaque {
    fn format_detail(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        match &self.detail {
            Some(detail) => out.write_str(detail),
            None => Ok(()),
        }
    }
}

impl ErrorValue for Opaque {
    fn type_key(&self) -> TypeKey {
        self.type_key.clone()
    }

    fn detail(&self) -> Option<&dyn FormatDetail> {
        self.detail.as_ref().map(|_| self as &dyn FormatDetail)
    }
}

/// Encoder/decoder of error chains bound to one registry.
#[derive(Debug, Clone)]
pub struct Codec {
    registry: Arc<Registry>,
    config: CodecConfig,
}

impl Codec {
    /// Create a codec over a frozen registry.
    pub fn new(registry: Arc<Registry>, config: CodecConfig) -> Self {
        Self { registry, config }
    }

    /// Returns the registry used for lookups.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the codec settings.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode a chain, including every mark, into a record tree.
    ///
    /// # Errors
    ///
    /// Returns `MarkError::DepthExceeded` if nesting exceeds `max_depth`.
    pub fn encode_chain(&self, node: &ErrorNode) -> Result<PortableRecord> {
        self.encode_at(node, 0)
    }

    /// Rebuild a chain from a record tree.
    ///
    /// Unknown types, failing decoders and inconsistent decoder output all
    /// fall back to [`Opaque`] values; only excessive nesting is an error.
    pub fn decode_chain(&self, record: &PortableRecord) -> Result<ErrorNode> {
        self.decode_at(record, 0)
    }

    /// Encode a chain straight to bytes.
    pub fn encode_to_bytes(&self, node: &ErrorNode) -> Result<Vec<u8>> {
        self.encode_chain(node)?.to_bytes()
    }

    /// Decode a chain straight from bytes.
    ///
    /// Input longer than `max_bytes` or nesting deeper than `max_depth` is
    /// rejected before any value is decoded.
    pub fn decode_from_bytes(&self, data: &[u8]) -> Result<ErrorNode> {
        self.decode_chain(&PortableRecord::from_bytes_with(data, &self.config)?)
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth >= self.config.max_depth {
            warn!("Error chain exceeds max depth {}", self.config.max_depth);
            return Err(MarkError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }
        Ok(())
    }

    fn encode_at(&self, node: &ErrorNode, depth: usize) -> Result<PortableRecord> {
        self.check_depth(depth)?;

        let mark = node
            .mark()
            .map(|mark| self.encode_at(mark, depth + 1).map(Box::new))
            .transpose()?;
        let cause = node
            .cause()
            .map(|cause| self.encode_at(cause, depth + 1).map(Box::new))
            .transpose()?;

        let value = node.value();
        let (type_key, payload) = self.encode_value(value);

        Ok(PortableRecord {
            type_key,
            message: node.message(),
            payload,
            detail: render_detail(value),
            mark,
            cause,
        })
    }

    fn encode_value(&self, value: &dyn ErrorValue) -> (TypeKey, Vec<u8>) {
        if let Some(opaque) = value.as_any().downcast_ref::<Opaque>() {
            return (opaque.type_key.clone(), opaque.payload.clone());
        }

        let type_key = value.type_key();
        let Some(encode) = self.registry.encoder(&type_key) else {
            debug!("No encoder registered for {}, sending message only", type_key);
            return (type_key, Vec::new());
        };

        match encode(value) {
            Ok(payload) => (type_key, payload),
            Err(e) => {
                warn!("Encoder for {} failed, sending message only: {}", type_key, e);
                (type_key, Vec::new())
            }
        }
    }

    fn decode_at(&self, record: &PortableRecord, depth: usize) -> Result<ErrorNode> {
        self.check_depth(depth)?;

        let cause = record
            .cause
            .as_deref()
            .map(|cause| self.decode_at(cause, depth + 1))
            .transpose()?;
        let mark = record
            .mark
            .as_deref()
            .map(|mark| self.decode_at(mark, depth + 1).map(Arc::new))
            .transpose()?;

        Ok(ErrorNode::from_parts(self.decode_value(record), cause, mark))
    }

    fn decode_value(&self, record: &PortableRecord) -> Box<dyn ErrorValue> {
        let Some(decode) = self.registry.decoder(&record.type_key) else {
            debug!("No decoder registered for {}, decoding as opaque", record.type_key);
            return Box::new(Opaque::from_record(record));
        };

        match decode(&record.message, &record.payload) {
            Ok(value) if value.type_key() == record.type_key && value.to_string() == record.message => {
                value
            }
            Ok(value) => {
                warn!(
                    "Decoder for {} produced inconsistent value ({}: {:?}), decoding as opaque",
                    record.type_key,
                    value.type_key(),
                    value.to_string()
                );
                Box::new(Opaque::from_record(record))
            }
            Err(e) => {
                warn!("Decoder for {} failed, decoding as opaque: {}", record.type_key, e);
                Box::new(Opaque::from_record(record))
            }
        }
    }
}
