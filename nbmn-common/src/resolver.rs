//! Movie record resolution
//!
//! Turns an IMDB id into a stored [`Movie`]:
//!
//! 1. normalize the id (empty is an error)
//! 2. load the stored record, cleaning up duplicates in force mode
//! 3. when forced, or when the record has no catalog data, take the
//!    metadata from an override if one exists, else fetch it remotely
//! 4. save and return the record
//!
//! Remote failures never fail resolution; the record is saved with whatever
//! (possibly empty) metadata came back.

use crate::db::Store;
use crate::imdb::ImdbId;
use crate::models::{Movie, MovieOverride};
use crate::remote::{get_movie_data, FetchOptions, MetadataSource};
use crate::{Error, Result};
use tracing::{debug, info, warn};

/// Resolves movies against a store and a metadata source
pub struct MovieResolver<'a, S, F> {
    store: &'a S,
    source: &'a F,
}

impl<'a, S: Store, F: MetadataSource> MovieResolver<'a, S, F> {
    pub fn new(store: &'a S, source: &'a F) -> Self {
        Self { store, source }
    }

    /// Resolve `raw` with default fetch options (`force` also bypasses
    /// caches)
    pub async fn find_by_imdb(&self, raw: &str, force: bool) -> Result<Movie> {
        let options = if force {
            FetchOptions::forced()
        } else {
            FetchOptions::default()
        };
        self.find_by_imdb_with(raw, force, options).await
    }

    pub async fn find_by_imdb_with(
        &self,
        raw: &str,
        force: bool,
        options: FetchOptions,
    ) -> Result<Movie> {
        let imdbid = ImdbId::parse(raw).ok_or_else(|| {
            Error::InvalidInput(format!("Missing IMDB ID - search is invalid: '{}'", raw))
        })?;

        let mut movie = self.load(&imdbid, force).await?;

        if force || movie.needs_fetch() {
            let extdata = match MovieOverride::find_by_imdb(self.store, &imdbid).await? {
                Some(ovr) => {
                    debug!(imdbid = %imdbid, "Using movie override");
                    ovr.extdata
                }
                None => get_movie_data(self.source, &imdbid, options).await,
            };

            movie.apply_extdata(extdata);
            self.store.save(&mut movie).await?;
            info!(imdbid = %imdbid, name = %movie.name, force, "Refreshed movie");
        }

        Ok(movie)
    }

    /// First stored record for `imdbid`, or a new unsaved one
    async fn load(&self, imdbid: &ImdbId, force: bool) -> Result<Movie> {
        let mut found = Movie::find_all_by_imdb(self.store, imdbid).await?;
        if found.is_empty() {
            return Ok(Movie::new(imdbid));
        }

        if found.len() > 1 {
            warn!(imdbid = %imdbid, count = found.len(), "Duplicate movies found");
            if force {
                for extra in &found[1..] {
                    warn!(
                        imdbid = %imdbid,
                        id = extra.id.as_deref().unwrap_or_default(),
                        "Deleting duplicate movie"
                    );
                    self.store.delete(extra).await?;
                }
            }
        }

        Ok(found.swap_remove(0))
    }
}
