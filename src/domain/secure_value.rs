//! Redacting holder for secured field values.
//!
//! Every raw value pulled out of a submission travels inside a [`SecureValue`]
//! until a connector writes it. The wrapper keeps values out of logs, debug
//! output and accidental serialization.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string wrapper that redacts its contents in Debug, Display, and serialization.
///
/// - Debug output shows `SecureValue([REDACTED])`
/// - Display output shows `[REDACTED]`
/// - Serialization outputs `"[REDACTED]"`; connectors call
///   [`SecureValue::expose`] explicitly when building a backend payload
/// - Memory is zeroed when dropped
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureValue(String);

impl Serialize for SecureValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecureValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(SecureValue(value))
    }
}

impl SecureValue {
    /// Wrap a raw value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw value. Never log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Length of the value without exposing it
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureValue([REDACTED])")
    }
}

impl fmt::Display for SecureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecureValue {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecureValue {}

impl From<String> for SecureValue {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecureValue {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
