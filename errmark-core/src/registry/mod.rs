//! Registry of error types that can be reconstructed from the wire.
//!
//! Registration is two-phase: components add their types to a
//! [`RegistryBuilder`] at startup, then the builder is frozen into an
//! immutable [`Registry`] that is shared (usually behind an `Arc`) by every
//! encode and decode call. A frozen registry needs no locking.
//!
//! A type that is never registered still round-trips its identity and
//! message; registration only adds structured reconstruction.

pub mod builtin;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{MarkError, Result};
use crate::node::ErrorValue;
use crate::type_key::TypeKey;

/// Turns a value into the payload stored in its portable record.
pub type EncodeFn = Arc<dyn Fn(&dyn ErrorValue) -> Result<Vec<u8>> + Send + Sync>;

/// Rebuilds a value from a record's message and payload.
pub type DecodeFn = Arc<dyn Fn(&str, &[u8]) -> Result<Box<dyn ErrorValue>> + Send + Sync>;

/// Encoder and decoder registered for one type key.
#[derive(Clone)]
pub struct RegistryEntry {
    encode: EncodeFn,
    decode: DecodeFn,
}

impl RegistryEntry {
    /// Returns the encoder.
    pub fn encoder(&self) -> &EncodeFn {
        &self.encode
    }

    /// Returns the decoder.
    pub fn decoder(&self) -> &DecodeFn {
        &self.decode
    }
}

/// Mutable registration phase of a [`Registry`].
///
/// # Example
///
/// ```rust
/// use std::fmt;
/// use serde::{Deserialize, Serialize};
/// use errmark_core::{ErrorValue, RegistryBuilder};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct RangeNotFound {
///     range_id: u64,
/// }
///
/// impl fmt::Display for RangeNotFound {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "range {} not found", self.range_id)
///     }
/// }
///
/// impl ErrorValue for RangeNotFound {}
///
/// let mut builder = RegistryBuilder::with_builtins();
/// builder.register_serde::<RangeNotFound>().unwrap();
///
/// // A second registration of the same type is rejected.
/// assert!(builder.register_serde::<RangeNotFound>().is_err());
///
/// let registry = builder.build();
/// assert!(registry.contains(&errmark_core::TypeKey::of::<RangeNotFound>()));
/// ```
#[derive(Default)]
pub struct RegistryBuilder {
    entries: HashMap<TypeKey, RegistryEntry>,
}

impl RegistryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with the built-in value types already registered.
    pub fn with_builtins() -> Self {
        let mut builder = Self::new();
        builtin::register_builtins(&mut builder);
        builder
    }

    /// Register an encoder/decoder pair under an explicit type key.
    ///
    /// The decoder must return a value whose type key and message equal the
    /// record it is given; results that do not are discarded at decode time.
    ///
    /// # Errors
    ///
    /// Returns `MarkError::DuplicateRegistration` if the key is already
    /// registered. The first registration stays in force.
    pub fn register_raw<E, D>(&mut self, type_key: TypeKey, encode: E, decode: D) -> Result<&mut Self>
    where
        E: Fn(&dyn ErrorValue) -> Result<Vec<u8>> + Send + Sync + 'static,
        D: Fn(&str, &[u8]) -> Result<Box<dyn ErrorValue>> + Send + Sync + 'static,
    {
        if self.entries.contains_key(&type_key) {
            warn!("Rejected duplicate error registration for {}", type_key);
            return Err(MarkError::DuplicateRegistration {
                type_key: type_key.to_string(),
            });
        }
        self.insert(
            type_key,
            RegistryEntry {
                encode: Arc::new(encode),
                decode: Arc::new(decode),
            },
        );
        Ok(self)
    }

    /// Register type `T` under its derived key with typed closures.
    pub fn register<T, E, D>(&mut self, encode: E, decode: D) -> Result<&mut Self>
    where
        T: ErrorValue,
        E: Fn(&T) -> Result<Vec<u8>> + Send + Sync + 'static,
        D: Fn(&str, &[u8]) -> Result<T> + Send + Sync + 'static,
    {
        let type_key = TypeKey::of::<T>();
        let key = type_key.clone();
        self.register_raw(
            type_key,
            move |value: &dyn ErrorValue| {
                let value = value.as_any().downcast_ref::<T>().ok_or_else(|| MarkError::Payload {
                    type_key: key.to_string(),
                    reason: "value does not have the registered type".into(),
                })?;
                encode(value)
            },
            move |message: &str, payload: &[u8]| {
                decode(message, payload).map(|value| Box::new(value) as Box<dyn ErrorValue>)
            },
        )
    }

    /// Register type `T` with its serde representation as the payload.
    pub fn register_serde<T>(&mut self) -> Result<&mut Self>
    where
        T: ErrorValue + Serialize + DeserializeOwned,
    {
        self.register::<T, _, _>(serde_encode::<T>, serde_decode::<T>)
    }

    /// Whether a type key is already registered.
    pub fn contains(&self, type_key: &TypeKey) -> bool {
        self.entries.contains_key(type_key)
    }

    /// Freeze the builder.
    pub fn build(self) -> Registry {
        debug!("Built error registry with {} types", self.entries.len());
        Registry {
            entries: self.entries,
        }
    }

    fn insert(&mut self, type_key: TypeKey, entry: RegistryEntry) {
        debug!("Registered error type {}", type_key);
        self.entries.insert(type_key, entry);
    }
}

fn serde_encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| MarkError::Payload {
        type_key: TypeKey::of::<T>().to_string(),
        reason: e.to_string(),
    })
}

fn serde_decode<T: DeserializeOwned>(_message: &str, payload: &[u8]) -> Result<T> {
    bincode::deserialize(payload).map_err(|e| MarkError::Payload {
        type_key: TypeKey::of::<T>().to_string(),
        reason: e.to_string(),
    })
}

/// Frozen table from type key to encoder/decoder.
///
/// Lookups never fail: a missing key is reported as `None` and handled by
/// the codec's opaque fallback.
#[derive(Clone, Default)]
pub struct Registry {
    entries: HashMap<TypeKey, RegistryEntry>,
}

impl Registry {
    /// A registry with no entries. Every type decodes as opaque.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding only the built-in value types.
    pub fn with_builtins() -> Self {
        RegistryBuilder::with_builtins().build()
    }

    /// Look up the encoder for a type key.
    #[inline]
    pub fn encoder(&self, type_key: &TypeKey) -> Option<&EncodeFn> {
        self.entries.get(type_key).map(RegistryEntry::encoder)
    }

    /// Look up the decoder for a type key.
    #[inline]
    pub fn decoder(&self, type_key: &TypeKey) -> Option<&DecodeFn> {
        self.entries.get(type_key).map(RegistryEntry::decoder)
    }

    /// Whether a type key is registered.
    pub fn contains(&self, type_key: &TypeKey) -> bool {
        self.entries.contains_key(type_key)
    }

    /// Returns the number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no types are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate the registered type keys in no particular order.
    pub fn type_keys(&self) -> impl Iterator<Item = &TypeKey> {
        self.entries.keys()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&TypeKey> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("Registry").field("types", &keys).finish()
    }
}
