//! Movie and movie override records
//!
//! Both are keyed by a normalized IMDB id and carry an [`ExtData`]. They are
//! separate record types: an override is admin-curated metadata that wins
//! over the catalog for its id, and is never itself shown as a movie.

use super::ExtData;
use crate::db::{Document, Store};
use crate::imdb::{norm_imdbid, ImdbId};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Index holding the normalized IMDB id
pub const IMDBID_INDEX: &str = "imdbid";

/// A movie that was (or may be) watched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub imdbid: String,
    #[serde(default)]
    pub extdata: ExtData,
}

impl Movie {
    /// Unsaved movie with no metadata yet
    pub fn new(imdbid: &ImdbId) -> Self {
        Self {
            imdbid: imdbid.to_string(),
            ..Self::default()
        }
    }

    /// Every stored movie for `imdbid`, oldest first
    pub async fn find_all_by_imdb<S: Store>(store: &S, imdbid: &ImdbId) -> Result<Vec<Self>> {
        store.find_by_index(IMDBID_INDEX, imdbid.as_str()).await
    }

    /// Whether the stored metadata needs a (re)fetch
    pub fn needs_fetch(&self) -> bool {
        self.extdata.is_empty() || !self.extdata.has_catalog()
    }

    /// Replace the metadata and pick up the catalog title when there is one
    pub fn apply_extdata(&mut self, extdata: ExtData) {
        self.extdata = extdata;
        if let Some(title) = self.extdata.title() {
            self.name = title.to_string();
        }
    }
}

impl Document for Movie {
    const TABLE: &'static str = "movies";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn indexes(&self) -> Vec<(&'static str, String)> {
        vec![(IMDBID_INDEX, norm_imdbid(&self.imdbid))]
    }

    fn after_load(&mut self) {
        self.imdbid = norm_imdbid(&self.imdbid);
    }
}

/// Admin-entered replacement for the catalog metadata of one movie
///
/// After saving or deleting an override, force-resolve the movie so the
/// stored record picks up the change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieOverride {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub imdbid: String,
    #[serde(default)]
    pub extdata: ExtData,
}

impl MovieOverride {
    pub fn new(imdbid: &ImdbId, name: impl Into<String>, extdata: ExtData) -> Self {
        Self {
            id: None,
            name: name.into(),
            imdbid: imdbid.to_string(),
            extdata,
        }
    }

    /// Stored override for `raw`, if any
    ///
    /// A plain lookup: nothing is fetched or created. Duplicate overrides
    /// are logged and all but the first are deleted.
    pub async fn find_by_imdb<S: Store>(store: &S, raw: impl fmt::Display) -> Result<Option<Self>> {
        let imdbid = ImdbId::parse(raw).ok_or_else(|| {
            Error::InvalidInput("Missing IMDB ID - search is invalid".to_string())
        })?;

        let mut found: Vec<Self> = store.find_by_index(IMDBID_INDEX, imdbid.as_str()).await?;
        if found.is_empty() {
            return Ok(None);
        }

        if found.len() > 1 {
            warn!(imdbid = %imdbid, count = found.len(), "Duplicate overrides found");
            for extra in &found[1..] {
                warn!(
                    imdbid = %imdbid,
                    id = extra.id().unwrap_or_default(),
                    "Deleting duplicate override"
                );
                store.delete(extra).await?;
            }
        }

        Ok(Some(found.swap_remove(0)))
    }
}

impl Document for MovieOverride {
    const TABLE: &'static str = "movie_overrides";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn indexes(&self) -> Vec<(&'static str, String)> {
        vec![(IMDBID_INDEX, norm_imdbid(&self.imdbid))]
    }

    fn after_load(&mut self) {
        self.imdbid = norm_imdbid(&self.imdbid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;
    use serde_json::json;

    async fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.ensure_table::<MovieOverride>().await.unwrap();
        store
    }

    fn extdata(value: serde_json::Value) -> ExtData {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_needs_fetch() {
        let id = ImdbId::parse(1).unwrap();
        let mut movie = Movie::new(&id);
        assert!(movie.needs_fetch());

        movie.extdata = extdata(json!({"update_time": "x", "omdb": {}}));
        assert!(movie.needs_fetch());

        movie.extdata = extdata(json!({"omdb": {"Title": "Foo"}}));
        assert!(!movie.needs_fetch());
    }

    #[test]
    fn test_apply_extdata_keeps_name_without_title() {
        let mut movie = Movie::new(&ImdbId::parse(1).unwrap());
        movie.name = "Typed In".to_string();

        movie.apply_extdata(extdata(json!({"omdb": {}})));
        assert_eq!(movie.name, "Typed In");

        movie.apply_extdata(extdata(json!({"omdb": {"Title": " Foo "}})));
        assert_eq!(movie.name, "Foo");
    }

    #[test]
    fn test_loaded_imdbid_is_normalized() {
        let mut movie: Movie = serde_json::from_value(json!({"imdbid": "42"})).unwrap();
        movie.after_load();
        assert_eq!(movie.imdbid, "tt0000042");
        assert_eq!(movie.indexes(), vec![(IMDBID_INDEX, "tt0000042".to_string())]);
    }

    #[tokio::test]
    async fn test_override_lookup() {
        let store = store().await;
        let id = ImdbId::parse(7).unwrap();

        assert!(MovieOverride::find_by_imdb(&store, &id).await.unwrap().is_none());
        assert!(matches!(
            MovieOverride::find_by_imdb(&store, "").await,
            Err(Error::InvalidInput(_))
        ));

        let mut ovr = MovieOverride::new(&id, "Mine", extdata(json!({"omdb": {"Title": "Mine"}})));
        store.save(&mut ovr).await.unwrap();

        let found = MovieOverride::find_by_imdb(&store, "tt7").await.unwrap().unwrap();
        assert_eq!(found.name, "Mine");
    }

    #[tokio::test]
    async fn test_override_duplicates_are_removed() {
        let store = store().await;
        let id = ImdbId::parse(7).unwrap();
        for name in ["first", "second"] {
            let mut ovr = MovieOverride::new(&id, name, ExtData::new());
            store.save(&mut ovr).await.unwrap();
        }

        let found = MovieOverride::find_by_imdb(&store, &id).await.unwrap().unwrap();
        assert_eq!(found.name, "first");

        let left: Vec<MovieOverride> = store.find_all().await.unwrap();
        assert_eq!(left.len(), 1);
    }
}
