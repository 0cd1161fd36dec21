//! Field keys
//!
//! A field key identifies one storable input: either a bare field (`"1"`) or a
//! sub-input of a composite field (`"2.3"`). Keys are serialized as strings so
//! they can be used directly as JSON object keys.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Key of a single input or a composite field's sub-input
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldKey {
    field: u32,
    input: Option<u32>,
}

impl FieldKey {
    /// Key for a single-input field
    pub const fn field(field: u32) -> Self {
        Self { field, input: None }
    }

    /// Key for a sub-input of a composite field
    pub const fn sub_input(field: u32, input: u32) -> Self {
        Self { field, input: Some(input) }
    }

    /// Id of the owning field
    pub const fn field_id(&self) -> u32 {
        self.field
    }

    /// Sub-input id, `None` for single-input fields
    pub const fn input_id(&self) -> Option<u32> {
        self.input
    }

    /// True for `{fieldId}.{subInputId}` keys
    pub const fn is_composite(&self) -> bool {
        self.input.is_some()
    }

    /// Name of the inbound request parameter carrying this input (`input_2_3`)
    pub fn post_name(&self) -> String {
        match self.input {
            Some(input) => format!("input_{}_{}", self.field, input),
            None => format!("input_{}", self.field),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.input {
            Some(input) => write!(f, "{}.{}", self.field, input),
            None => write!(f, "{}", self.field),
        }
    }
}

/// Error returned when a string is not a valid field key
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid field key '{0}'")]
pub struct InvalidFieldKey(pub String);

impl FromStr for FieldKey {
    type Err = InvalidFieldKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidFieldKey(s.to_string());
        match s.split_once('.') {
            Some((field, input)) => Ok(Self::sub_input(
                field.parse().map_err(|_| invalid())?,
                input.parse().map_err(|_| invalid())?,
            )),
            None => Ok(Self::field(s.parse().map_err(|_| invalid())?)),
        }
    }
}

impl Serialize for FieldKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
