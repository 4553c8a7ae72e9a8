//! Codec configuration.

use serde::{Deserialize, Serialize};

use crate::error::{MarkError, Result};

/// Settings for [`Codec`](crate::Codec).
///
/// # Example
///
/// ```rust
/// use errmark_core::CodecConfig;
///
/// let config = CodecConfig::from_json_str(r#"{ "max_depth": 64 }"#).unwrap();
/// assert_eq!(config.max_depth, 64);
/// assert_eq!(config.max_bytes, CodecConfig::DEFAULT_MAX_BYTES);
///
/// let defaults = CodecConfig::from_json_str("{}").unwrap();
/// assert_eq!(defaults, CodecConfig::default());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Maximum nesting of cause and mark edges accepted by encode and decode.
    pub max_depth: usize,

    /// Maximum size in bytes of an encoded chain accepted by
    /// [`Codec::decode_from_bytes`](crate::Codec::decode_from_bytes).
    pub max_bytes: u64,
}

impl CodecConfig {
    /// Default bound on chain nesting.
    pub const DEFAULT_MAX_DEPTH: usize = 256;

    /// Default bound on the byte form (4 MiB).
    pub const DEFAULT_MAX_BYTES: u64 = 4 * 1024 * 1024;

    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| MarkError::ConfigError(format!("Failed to parse codec config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the settings are usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(MarkError::ConfigError("max_depth must be at least 1".into()));
        }
        if self.max_bytes == 0 {
            return Err(MarkError::ConfigError("max_bytes must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_bytes: Self::DEFAULT_MAX_BYTES,
        }
    }
}
