//! Type keys: the derived identity string of a concrete error shape.
//!
//! A key is `std::any::type_name` of the value's type, i.e. its module
//! path plus its name. It never depends on field values, so two values of
//! one type always share a key and two distinct types never collide.
//!
//! The key is part of the wire contract: moving or renaming a type changes
//! its key, and peers built before the move will see it as a different type.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity string for one concrete error type.
///
/// # Example
///
/// ```rust
/// use errmark_core::TypeKey;
///
/// struct Timeout;
/// struct Refused;
///
/// assert_eq!(TypeKey::of::<Timeout>(), TypeKey::of::<Timeout>());
/// assert_ne!(TypeKey::of::<Timeout>(), TypeKey::of::<Refused>());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeKey(Cow<'static, str>);

impl TypeKey {
    /// Derive the key of type `T`.
    #[inline]
    pub fn of<T: ?Sized>() -> Self {
        Self(Cow::Borrowed(std::any::type_name::<T>()))
    }

    /// Build a key from a string received off the wire or supplied by hand.
    pub fn new(key: impl Into<String>) -> Self {
        Self(Cow::Owned(key.into()))
    }

    /// Returns the key as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for TypeKey {
    fn from(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }
}

impl From<String> for TypeKey {
    fn from(key: String) -> Self {
        Self(Cow::Owned(key))
    }
}
