//! Shared error types and helpers for the integration tests.

#![allow(dead_code)]

use std::fmt;
use std::sync::Arc;

use errmark_core::{Codec, CodecConfig, ErrorNode, ErrorValue, FormatDetail, RegistryBuilder};
use serde::{Deserialize, Serialize};

/// Unregistered leaf type.
#[derive(Debug)]
pub struct Fundamental {
    pub msg: String,
}

impl fmt::Display for Fundamental {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg)
    }
}

impl ErrorValue for Fundamental {}

/// A second unregistered leaf type, structurally identical to `Fundamental`.
#[derive(Debug)]
pub struct Fundamental2 {
    pub msg: String,
}

impl fmt::Display for Fundamental2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg)
    }
}

impl ErrorValue for Fundamental2 {}

/// Registered leaf type with a serde payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct Stacked {
    pub msg: String,
    pub frames: Vec<String>,
}

impl fmt::Display for Stacked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg)
    }
}

impl ErrorValue for Stacked {}

/// Registered wrapper that adds no message of its own.
#[derive(Debug, Serialize, Deserialize)]
pub struct WithStack;

impl fmt::Display for WithStack {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}

impl ErrorValue for WithStack {}

/// Unregistered wrapper with verbose detail.
#[derive(Debug)]
pub struct VerboseWrapper {
    pub msg: String,
}

impl fmt::Display for VerboseWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg)
    }
}

impl FormatDetail for VerboseWrapper {
    fn format_detail(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "-- verbose wrapper:\n{}", self.msg)
    }
}

impl ErrorValue for VerboseWrapper {
    fn detail(&self) -> Option<&dyn FormatDetail> {
        Some(self)
    }
}

pub fn fundamental(msg: &str) -> ErrorNode {
    ErrorNode::new(Fundamental { msg: msg.into() })
}

pub fn fundamental2(msg: &str) -> ErrorNode {
    ErrorNode::new(Fundamental2 { msg: msg.into() })
}

pub fn stacked(msg: &str) -> ErrorNode {
    ErrorNode::new(Stacked {
        msg: msg.into(),
        frames: vec!["main".into(), "serve".into()],
    })
}

/// Route engine logs to the test output; safe to call from every test.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .with_target(true)
        .try_init();
}

/// Codec knowing the built-ins plus `Stacked` and `WithStack`.
pub fn codec() -> Codec {
    init_test_logging();
    let mut builder = RegistryBuilder::with_builtins();
    builder
        .register_serde::<Stacked>()
        .unwrap()
        .register_serde::<WithStack>()
        .unwrap();
    Codec::new(Arc::new(builder.build()), CodecConfig::default())
}

/// Codec that knows nothing at all.
pub fn bare_codec() -> Codec {
    init_test_logging();
    Codec::new(Arc::new(RegistryBuilder::new().build()), CodecConfig::default())
}

/// Send an error through the byte form and back.
pub fn network(err: &ErrorNode) -> ErrorNode {
    let codec = codec();
    let bytes = codec.encode_to_bytes(err).unwrap();
    codec.decode_from_bytes(&bytes).unwrap()
}
