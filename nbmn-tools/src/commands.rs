//! Maintenance commands
//!
//! Each command works on any [`Store`], so the binary runs them against the
//! site database and the tests against an in-memory one.

use nbmn_common::db::{SqliteStore, Store};
use nbmn_common::models::ensure_tables;
use nbmn_common::remote::MetadataSource;
use nbmn_common::{norm_imdbid, Attendee, Movie, MovieResolver, Night, Oligarchs, Result};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, warn};

/// Outcome of [`fix_movies`]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FixMoviesReport {
    pub refreshed: usize,
    pub failed: Vec<String>,
}

/// Force-resolve every IMDB id referenced by a night or a stored movie
pub async fn fix_movies<S: Store, F: MetadataSource>(
    store: &S,
    source: &F,
) -> Result<FixMoviesReport> {
    let nights: Vec<Night> = store.find_all().await?;
    let movies: Vec<Movie> = store.find_all().await?;

    let ids: BTreeSet<String> = nights
        .iter()
        .map(|n| n.imdbid.as_str())
        .chain(movies.iter().map(|m| m.imdbid.as_str()))
        .map(norm_imdbid)
        .filter(|id| !id.is_empty())
        .collect();
    info!(count = ids.len(), "Refreshing movies");

    let resolver = MovieResolver::new(store, source);
    let mut report = FixMoviesReport::default();
    for id in ids {
        match resolver.find_by_imdb(&id, true).await {
            Ok(movie) => {
                info!(imdbid = %id, name = %movie.name, "Fixed movie");
                report.refreshed += 1;
            }
            Err(e) => {
                warn!(imdbid = %id, error = %e, "Could not fix movie");
                report.failed.push(id);
            }
        }
    }
    Ok(report)
}

/// Create an attendee record for everyone named on a night; returns the
/// names created
pub async fn fix_peeps<S: Store>(store: &S, oligarchs: &Oligarchs) -> Result<Vec<String>> {
    let nights: Vec<Night> = store.find_all().await?;
    let names: Vec<String> = nights
        .into_iter()
        .flat_map(|n| n.attendees)
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    oligarchs.ensure_attendees(store, &names).await
}

/// Movies no night refers to, oldest first; deleted when `delete` is set
pub async fn orphan_movies<S: Store>(store: &S, delete: bool) -> Result<Vec<Movie>> {
    let nights: Vec<Night> = store.find_all().await?;
    let watched: BTreeSet<String> = nights.iter().map(|n| norm_imdbid(&n.imdbid)).collect();

    let orphans: Vec<Movie> = store
        .find_all::<Movie>()
        .await?
        .into_iter()
        .filter(|m| !watched.contains(&norm_imdbid(&m.imdbid)))
        .collect();

    if delete {
        for movie in &orphans {
            store.delete(movie).await?;
            info!(imdbid = %movie.imdbid, name = %movie.name, "Deleted orphan movie");
        }
    }
    Ok(orphans)
}

/// Record counts copied by [`export`]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub attendees: usize,
    pub nights: usize,
    pub movies: usize,
}

/// Copy attendees, nights and movies into the SQLite file at `target`
///
/// Record ids are kept, so exporting twice into the same file updates the
/// copies instead of duplicating them.
pub async fn export<S: Store>(store: &S, target: &Path) -> Result<ExportReport> {
    let dest = SqliteStore::open(target).await?;
    ensure_tables(&dest).await?;

    let report = ExportReport {
        attendees: copy_all::<Attendee, _>(store, &dest).await?,
        nights: copy_all::<Night, _>(store, &dest).await?,
        movies: copy_all::<Movie, _>(store, &dest).await?,
    };
    info!(target = %target.display(), ?report, "Export complete");
    Ok(report)
}

async fn copy_all<T: nbmn_common::db::Document, S: Store>(
    from: &S,
    to: &SqliteStore,
) -> Result<usize> {
    let docs: Vec<T> = from.find_all().await?;
    let count = docs.len();
    for mut doc in docs {
        to.save(&mut doc).await?;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbmn_common::remote::{FetchOptions, RawPayload};
    use nbmn_common::ImdbId;
    use serde_json::json;
    use std::sync::Mutex;

    /// Answers every id with its own title and records the ids asked for
    #[derive(Default)]
    struct EchoSource {
        asked: Mutex<Vec<String>>,
    }

    impl MetadataSource for EchoSource {
        async fn fetch(&self, id: &ImdbId, _options: FetchOptions) -> RawPayload {
            self.asked.lock().unwrap().push(id.to_string());
            match json!({"Response": "True", "Title": format!("Title {}", id)}) {
                serde_json::Value::Object(map) => map,
                _ => unreachable!(),
            }
        }
    }

    async fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().await.unwrap();
        ensure_tables(&store).await.unwrap();
        store
    }

    async fn add_night(store: &SqliteStore, datestr: &str, imdbid: &str, attendees: &[&str]) {
        let mut night = Night::new(datestr);
        night.moviename = "Movie".to_string();
        night.imdbid = imdbid.to_string();
        night.attendees = attendees.iter().map(|a| a.to_string()).collect();
        store.save(&mut night).await.unwrap();
    }

    async fn add_movie(store: &SqliteStore, imdbid: &str, name: &str) {
        let mut movie = Movie {
            name: name.to_string(),
            imdbid: imdbid.to_string(),
            ..Movie::default()
        };
        store.save(&mut movie).await.unwrap();
    }

    #[tokio::test]
    async fn test_fix_movies_covers_nights_and_movies() {
        let store = store().await;
        add_night(&store, "20170303", "0000001", &["Adam", "Marty"]).await;
        add_night(&store, "20170310", "", &["Adam", "Marty"]).await;
        add_movie(&store, "tt0000001", "Old").await;
        add_movie(&store, "tt0000002", "Other").await;

        let source = EchoSource::default();
        let report = fix_movies(&store, &source).await.unwrap();

        assert_eq!(report.refreshed, 2);
        assert!(report.failed.is_empty());
        assert_eq!(
            *source.asked.lock().unwrap(),
            vec!["tt0000001".to_string(), "tt0000002".to_string()]
        );

        let movies: Vec<Movie> = store.find_all().await.unwrap();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].name, "Title tt0000001");
    }

    #[tokio::test]
    async fn test_fix_peeps_creates_missing() {
        let store = store().await;
        add_night(&store, "20170303", "", &["Adam", "Carol", " Dave "]).await;
        add_night(&store, "20170310", "", &["Carol", "Marty"]).await;
        let mut adam = Attendee::new("Adam");
        store.save(&mut adam).await.unwrap();

        let created = fix_peeps(&store, &Oligarchs::default()).await.unwrap();
        assert_eq!(created, vec!["Carol", "Dave", "Marty"]);

        let again = fix_peeps(&store, &Oligarchs::default()).await.unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_orphan_movies() {
        let store = store().await;
        add_night(&store, "20170303", "tt0000001", &["Adam", "Marty"]).await;
        add_movie(&store, "tt0000001", "Watched").await;
        add_movie(&store, "tt0000009", "Orphan").await;

        let listed = orphan_movies(&store, false).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Orphan");
        assert_eq!(store.find_all::<Movie>().await.unwrap().len(), 2);

        let deleted = orphan_movies(&store, true).await.unwrap();
        assert_eq!(deleted.len(), 1);
        let left: Vec<Movie> = store.find_all().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].name, "Watched");
    }

    #[tokio::test]
    async fn test_export_copies_and_is_repeatable() {
        let store = store().await;
        add_night(&store, "20170303", "tt0000001", &["Adam", "Marty"]).await;
        add_movie(&store, "tt0000001", "Heat").await;
        Oligarchs::default()
            .ensure_attendees(&store, &[])
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("export.db");

        let report = export(&store, &target).await.unwrap();
        assert_eq!(
            report,
            ExportReport {
                attendees: 2,
                nights: 1,
                movies: 1
            }
        );

        export(&store, &target).await.unwrap();
        let copy = SqliteStore::open(&target).await.unwrap();
        assert_eq!(copy.find_all::<Attendee>().await.unwrap().len(), 2);
        let nights: Vec<Night> = copy.find_all().await.unwrap();
        assert_eq!(nights.len(), 1);
        assert_eq!(nights[0].datestr, "20170303");
        assert_eq!(copy.find_all::<Movie>().await.unwrap()[0].name, "Heat");
    }
}
