//! Domain ID Types with NewType Pattern
//!
//! Numeric identifiers handed to us by the host form framework. Wrapping them
//! keeps a form id from being passed where an entry id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to generate NewType numeric ID wrappers with all required traits
macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw identifier
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Get the inner value
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

numeric_id!(
    /// Identifier of a form definition
    FormId
);

numeric_id!(
    /// Identifier of a persisted entry (one form submission)
    EntryId
);

numeric_id!(
    /// Identifier of the site hosting the forms
    SiteId
);

impl Default for SiteId {
    fn default() -> Self {
        Self(1)
    }
}
