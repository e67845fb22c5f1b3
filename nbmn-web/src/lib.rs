//! nbmn-web library - Nutbush Movie Night site
//!
//! Every page is served as a JSON document; rendering is left to the
//! client. Edits (nights, overrides) require an admin identity supplied by
//! the OAuth proxy in front of the site.

use axum::Router;
use nbmn_common::config::{AuthConfig, TomlConfig};
use nbmn_common::db::Store;
use nbmn_common::remote::OmdbClient;
use nbmn_common::{MovieResolver, Oligarchs, SlackNotifier};
use std::path::PathBuf;
use std::sync::Arc;

pub mod api;
pub mod error;
pub mod views;

/// Store types the site can run on
pub trait SiteStore: Store + Clone + 'static {}

impl<T: Store + Clone + 'static> SiteStore for T {}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState<S> {
    pub store: S,
    pub omdb: OmdbClient,
    pub notifier: SlackNotifier,
    pub oligarchs: Oligarchs,
    /// Emails allowed to edit
    pub admins: Arc<Vec<String>>,
    pub auth: Arc<AuthConfig>,
    /// Root of static files (posters, people images, robots.txt)
    pub static_dir: Arc<PathBuf>,
}

impl<S: SiteStore> AppState<S> {
    pub fn new(store: S, omdb: OmdbClient, config: &TomlConfig) -> Self {
        Self {
            store,
            omdb,
            notifier: SlackNotifier::new(config.slack.clone()),
            oligarchs: Oligarchs::new(config.oligarchs.iter().cloned()),
            admins: Arc::new(config.admins.clone()),
            auth: Arc::new(config.auth.clone()),
            static_dir: Arc::new(config.static_dir.clone()),
        }
    }

    /// Movie resolver over this state's store and OMDB client
    pub fn resolver(&self) -> MovieResolver<'_, S, OmdbClient> {
        MovieResolver::new(&self.store, &self.omdb)
    }
}

/// Build application router
pub fn build_router<S: SiteStore>(state: AppState<S>) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};
    use tower_http::services::{ServeDir, ServeFile};
    use tower_http::trace::TraceLayer;

    // Admin-only routes
    let protected = Router::new()
        .route("/night/:datestr", post(api::nights::save_night::<S>))
        .route(
            "/override/:key",
            put(api::overrides::put_override::<S>).delete(api::overrides::delete_override::<S>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::require_admin::<S>,
        ));

    let public = Router::new()
        .route("/", get(api::home::main_page::<S>))
        .route("/movie", get(api::movies::list_movies::<S>))
        .route("/movie/:key", get(api::movies::show_movie::<S>))
        .route("/movie/:key/poster", get(api::movies::movie_poster::<S>))
        .route("/moviemater/:key", get(api::movies::movie_mater::<S>))
        .route("/badmovie/:key", get(api::movies::bad_movie::<S>))
        .route("/person", get(api::people::list_people::<S>))
        .route("/person/:name", get(api::people::show_person::<S>))
        .route("/night", get(api::nights::list_nights::<S>))
        .route("/night/:datestr", get(api::nights::show_night::<S>))
        .route("/override/:key", get(api::overrides::get_override::<S>))
        .route("/gimme", get(api::data::data_dump::<S>))
        .route("/feed/atom", get(api::feeds::atom_feed::<S>))
        .route("/feed/ical", get(api::feeds::ical_feed::<S>))
        .merge(api::health::health_routes::<S>());

    let static_dir = state.static_dir.as_ref().clone();

    Router::new()
        .merge(public)
        .merge(protected)
        .route_service("/robots.txt", ServeFile::new(static_dir.join("robots.txt")))
        .route_service("/humans.txt", ServeFile::new(static_dir.join("humans.txt")))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
