//! Error types for the errmark core library.
//!
//! These are failures of the engine itself (registration conflicts,
//! malformed wire bytes, runaway nesting), never the application errors
//! that flow through it.

use thiserror::Error;

/// Errors that can occur in errmark core operations.
#[derive(Debug, Error)]
pub enum MarkError {
    /// A second registration was attempted for a type key already in the registry.
    #[error("Duplicate registration for type key '{type_key}'")]
    DuplicateRegistration {
        /// The conflicting type key
        type_key: String,
    },

    /// Cause/mark nesting went deeper than the configured bound.
    #[error("Error chain nesting exceeds the limit of {limit}")]
    DepthExceeded {
        /// The configured maximum depth
        limit: usize,
    },

    /// Wire bytes could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A registered encoder or decoder rejected its input.
    #[error("Payload error for '{type_key}': {reason}")]
    Payload {
        /// Type key of the value being encoded or decoded
        type_key: String,
        /// Why the payload was rejected
        reason: String,
    },

    /// Invalid codec configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for errmark operations.
pub type Result<T> = std::result::Result<T, MarkError>;
