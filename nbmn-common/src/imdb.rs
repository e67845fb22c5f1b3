//! IMDB identifier helpers
//!
//! This is a leaf module: nothing else in the crate is imported here.
//!
//! The canonical identifier is the `tt` prefix followed by the decimal id
//! zero-padded to at least seven digits (`tt0000001`). Ids that need more
//! than seven digits keep their full width (`tt12345678`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix used by the catalog for title identifiers
pub const IMDB_PREFIX: &str = "tt";

/// Minimum number of digits after the prefix
const MIN_DIGITS: usize = 7;

/// Return a normalized IMDB id, or an empty string when there is none
///
/// Accepts anything displayable, so both `"tt0000001"` and `1` work.
/// Leading `t` characters and leading zeros are stripped; whatever is left
/// must be a run of ASCII digits. Anything else (including `0`) normalizes
/// to `""`, which every caller treats as "no identifier".
pub fn norm_imdbid(raw: impl fmt::Display) -> String {
    let text = raw.to_string().trim().to_lowercase();
    let digits = text.trim_start_matches('t').trim_start_matches('0');

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return String::new();
    }

    format!("{}{:0>width$}", IMDB_PREFIX, digits, width = MIN_DIGITS)
}

/// [`norm_imdbid`] for values that may be absent
pub fn norm_opt_imdbid<T: fmt::Display>(raw: Option<T>) -> String {
    raw.map(|value| norm_imdbid(value)).unwrap_or_default()
}

/// A normalized, non-empty IMDB identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImdbId(String);

impl ImdbId {
    /// Normalize `raw`; `None` when it does not contain an identifier
    pub fn parse(raw: impl fmt::Display) -> Option<Self> {
        let id = norm_imdbid(raw);
        if id.is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ImdbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ImdbId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs() {
        assert_eq!(norm_imdbid(0), "");
        assert_eq!(norm_imdbid("0"), "");
        assert_eq!(norm_imdbid(""), "");
        assert_eq!(norm_imdbid("   "), "");
        assert_eq!(norm_imdbid("tt"), "");
        assert_eq!(norm_opt_imdbid::<&str>(None), "");
    }

    #[test]
    fn test_small_ids_are_padded() {
        assert_eq!(norm_imdbid(1), "tt0000001");
        assert_eq!(norm_imdbid("1"), "tt0000001");
        assert_eq!(norm_imdbid("0000000001"), "tt0000001");
        assert_eq!(norm_imdbid("tt1"), "tt0000001");
        assert_eq!(norm_imdbid("tt0000000001"), "tt0000001");
        assert_eq!(norm_imdbid("tt0000001"), "tt0000001");
        assert_eq!(norm_imdbid(" TT0000001 "), "tt0000001");
        assert_eq!(norm_opt_imdbid(Some(1)), "tt0000001");
    }

    #[test]
    fn test_seven_digit_ids() {
        assert_eq!(norm_imdbid(1234567), "tt1234567");
        assert_eq!(norm_imdbid("1234567"), "tt1234567");
        assert_eq!(norm_imdbid("tt1234567"), "tt1234567");
    }

    #[test]
    fn test_wide_ids_keep_full_width() {
        assert_eq!(norm_imdbid(12345678), "tt12345678");
        assert_eq!(norm_imdbid("tt0012345678"), "tt12345678");
        assert_eq!(
            norm_imdbid("98765432109876543210987"),
            "tt98765432109876543210987"
        );
    }

    #[test]
    fn test_non_numeric_remainder() {
        assert_eq!(norm_imdbid("nm0000001"), "");
        assert_eq!(norm_imdbid("tt12ab"), "");
        assert_eq!(norm_imdbid("-5"), "");
        assert_eq!(norm_imdbid("1.5"), "");
    }

    #[test]
    fn test_idempotent() {
        for raw in ["1", "tt1", "0042", "1234567", "tt12345678", "abc", ""] {
            let once = norm_imdbid(raw);
            assert_eq!(norm_imdbid(&once), once, "input {:?}", raw);
        }
    }

    #[test]
    fn test_parse_newtype() {
        assert_eq!(ImdbId::parse("tt1").unwrap().as_str(), "tt0000001");
        assert!(ImdbId::parse("").is_none());
        assert!(ImdbId::parse(0).is_none());

        let id = ImdbId::parse(1234567).unwrap();
        assert_eq!(id.to_string(), "tt1234567");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"tt1234567\"");
    }
}
