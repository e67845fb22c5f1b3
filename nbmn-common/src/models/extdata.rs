//! Movie metadata value object

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Catalog metadata attached to a movie or an override
///
/// Arbitrary key/value data. Remote lookups produce
/// `{"update_time": "...", "omdb": {...normalized payload...}}`; overrides
/// may hold anything an admin typed in, but only the `omdb` sub-object is
/// read back by the rest of the site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtData(Map<String, Value>);

impl ExtData {
    pub const UPDATE_TIME: &'static str = "update_time";
    pub const OMDB: &'static str = "omdb";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Shape produced by a remote lookup
    pub fn from_remote(update_time: String, omdb: Map<String, Value>) -> Self {
        let mut map = Map::new();
        map.insert(Self::UPDATE_TIME.to_string(), Value::String(update_time));
        map.insert(Self::OMDB.to_string(), Value::Object(omdb));
        Self(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn omdb(&self) -> Option<&Map<String, Value>> {
        self.0.get(Self::OMDB).and_then(Value::as_object)
    }

    /// True when a non-empty catalog object is present
    pub fn has_catalog(&self) -> bool {
        self.omdb().map_or(false, |omdb| !omdb.is_empty())
    }

    pub fn update_time(&self) -> Option<&str> {
        self.0.get(Self::UPDATE_TIME).and_then(Value::as_str)
    }

    /// Catalog title, trimmed; `None` when blank
    pub fn title(&self) -> Option<&str> {
        self.omdb_str("Title")
    }

    /// Catalog poster URL; `None` when blank or "N/A"
    pub fn poster(&self) -> Option<&str> {
        self.omdb_str("Poster")
            .filter(|url| !url.eq_ignore_ascii_case(crate::remote::normalize::NOT_APPLICABLE))
    }

    fn omdb_str(&self, key: &str) -> Option<&str> {
        self.omdb()
            .and_then(|omdb| omdb.get(key))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl From<Map<String, Value>> for ExtData {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ext(value: Value) -> ExtData {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_catalog_presence() {
        assert!(!ExtData::new().has_catalog());
        assert!(!ext(json!({"omdb": {}})).has_catalog());
        assert!(!ext(json!({"update_time": "x"})).has_catalog());
        assert!(ext(json!({"omdb": {"Title": "Foo"}})).has_catalog());
    }

    #[test]
    fn test_title_and_poster() {
        let data = ext(json!({"omdb": {"Title": "  Foo ", "Poster": "N/A"}}));
        assert_eq!(data.title(), Some("Foo"));
        assert_eq!(data.poster(), None);

        let data = ext(json!({"omdb": {"Title": "", "Poster": "http://x/p.jpg"}}));
        assert_eq!(data.title(), None);
        assert_eq!(data.poster(), Some("http://x/p.jpg"));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let data = ExtData::from_remote("now".to_string(), Map::new());
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({"update_time": "now", "omdb": {}})
        );
    }
}
