//! Movie pages

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect},
    Json,
};
use nbmn_common::remote::FetchOptions;
use nbmn_common::{ExtData, ImdbId, Movie};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::views::MovieView;
use crate::{AppState, SiteStore};

#[derive(Debug, Serialize)]
pub struct MoviePage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie: Option<MovieView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movies: Option<Vec<MovieView>>,
    pub movie_name: String,
}

/// GET /movie
pub async fn list_movies<S: SiteStore>(State(state): State<AppState<S>>) -> ApiResult<Json<MoviePage>> {
    let mut movies: Vec<Movie> = state.store.find_all().await?;
    movies.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(MoviePage {
        movie: None,
        movies: Some(movies.into_iter().map(MovieView::from).collect()),
        movie_name: "ALL".to_string(),
    }))
}

/// GET /movie/:key
pub async fn show_movie<S: SiteStore>(
    State(state): State<AppState<S>>,
    Path(key): Path<String>,
) -> ApiResult<Json<MoviePage>> {
    let movie = state.resolver().find_by_imdb(&key, false).await?;
    let movie_name = if movie.name.is_empty() {
        "???".to_string()
    } else {
        movie.name.clone()
    };

    Ok(Json(MoviePage {
        movie: Some(MovieView::from(movie)),
        movies: None,
        movie_name,
    }))
}

/// GET /movie/:key/poster
pub async fn movie_poster<S: SiteStore>(
    State(state): State<AppState<S>>,
    Path(key): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let imdbid = ImdbId::parse(&key)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid IMDB id '{}'", key)))?;
    let poster = state.omdb.fetch_poster(&imdbid).await?;
    Ok(([(header::CONTENT_TYPE, poster.content_type)], poster.bytes))
}

/// GET /moviemater/:key - the stored metadata only
pub async fn movie_mater<S: SiteStore>(
    State(state): State<AppState<S>>,
    Path(key): Path<String>,
) -> ApiResult<Json<ExtData>> {
    let movie = state.resolver().find_by_imdb(&key, false).await?;
    Ok(Json(movie.extdata))
}

#[derive(Debug, Default, Deserialize)]
pub struct BadMovieParams {
    /// Non-zero asks for Rotten Tomatoes data as well
    pub use_rt: Option<String>,
}

impl BadMovieParams {
    fn use_rt(&self) -> bool {
        self.use_rt
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map_or(false, |v| v != 0)
    }
}

/// GET /badmovie/:key - force a refresh, then show the movie
pub async fn bad_movie<S: SiteStore>(
    State(state): State<AppState<S>>,
    Path(key): Path<String>,
    Query(params): Query<BadMovieParams>,
) -> ApiResult<Redirect> {
    let use_rt = params.use_rt();
    info!(key = %key, use_rt, "Bad movie - forcing refresh");

    let options = FetchOptions {
        include_tomatoes: use_rt,
        bypass_cache: true,
    };
    let movie = state
        .resolver()
        .find_by_imdb_with(&key, true, options)
        .await?;

    // Canonical id, never the raw path segment
    Ok(Redirect::to(&format!("/movie/{}", movie.imdbid)))
}
