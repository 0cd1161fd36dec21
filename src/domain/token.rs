//! Sentinel tokens
//!
//! The placeholder written into the host's entry store in place of a secured
//! value. Canonical form is `ufh-gf-secured/{fieldKey}`; the bare
//! `ufh-gf-secured` written by early revisions is still recognised when
//! reading so those entries keep rehydrating.

use super::field_key::FieldKey;
use std::fmt;

/// Prefix shared by every sentinel token
pub const TOKEN_PREFIX: &str = "ufh-gf-secured";

/// A parsed sentinel token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentinelToken {
    /// `ufh-gf-secured/{fieldKey}`
    Keyed(FieldKey),
    /// Bare `ufh-gf-secured`; the key comes from the field being displayed
    Legacy,
}

impl SentinelToken {
    /// Build the canonical token for a field key
    pub fn for_key(key: FieldKey) -> Self {
        Self::Keyed(key)
    }

    /// Parse a stored value. Returns `None` for anything that is not a token.
    pub fn parse(value: &str) -> Option<Self> {
        let rest = value.trim().strip_prefix(TOKEN_PREFIX)?;
        if rest.is_empty() {
            return Some(Self::Legacy);
        }
        rest.strip_prefix('/')?.parse::<FieldKey>().ok().map(Self::Keyed)
    }

    /// True when `value` is a sentinel token of either form
    pub fn is_token(value: &str) -> bool {
        Self::parse(value).is_some()
    }

    /// Key to look the real value up under. Legacy tokens use `fallback`.
    pub fn resolve_key(&self, fallback: FieldKey) -> FieldKey {
        match self {
            Self::Keyed(key) => *key,
            Self::Legacy => fallback,
        }
    }
}

impl fmt::Display for SentinelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyed(key) => write!(f, "{}/{}", TOKEN_PREFIX, key),
            Self::Legacy => f.write_str(TOKEN_PREFIX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_canonical_format() {
        assert_eq!(SentinelToken::for_key(FieldKey::field(1)).to_string(), "ufh-gf-secured/1");
        assert_eq!(
            SentinelToken::for_key(FieldKey::sub_input(2, 3)).to_string(),
            "ufh-gf-secured/2.3"
        );
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!(
            SentinelToken::parse("ufh-gf-secured/2.4"),
            Some(SentinelToken::Keyed(FieldKey::sub_input(2, 4)))
        );
        assert_eq!(SentinelToken::parse("ufh-gf-secured"), Some(SentinelToken::Legacy));
        assert_eq!(SentinelToken::parse("Jane Doe"), None);
        assert_eq!(SentinelToken::parse("ufh-gf-secured/"), None);
        assert_eq!(SentinelToken::parse("ufh-gf-secured/abc"), None);
        assert_eq!(SentinelToken::parse("ufh-gf-securedX"), None);
    }

    #[test]
    fn test_legacy_resolves_to_fallback() {
        let fallback = FieldKey::field(9);
        assert_eq!(SentinelToken::Legacy.resolve_key(fallback), fallback);
        assert_eq!(SentinelToken::Keyed(FieldKey::field(1)).resolve_key(fallback), FieldKey::field(1));
    }

    proptest! {
        #[test]
        fn prop_token_parses_back(field in 0u32..10_000, input in proptest::option::of(0u32..100)) {
            let key = match input {
                Some(input) => FieldKey::sub_input(field, input),
                None => FieldKey::field(field),
            };
            let token = SentinelToken::for_key(key).to_string();
            prop_assert_eq!(SentinelToken::parse(&token), Some(SentinelToken::Keyed(key)));
        }
    }
}
