//! Movie override editing
//!
//! Saving or deleting an override force-resolves the movie so the stored
//! record reflects the change immediately.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use nbmn_common::{ExtData, ImdbId, MovieOverride, User};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::views::MovieView;
use crate::{AppState, SiteStore};

#[derive(Debug, Deserialize)]
pub struct OverrideRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub extdata: ExtData,
}

#[derive(Debug, Serialize)]
pub struct OverrideResponse {
    #[serde(rename = "override", skip_serializing_if = "Option::is_none")]
    pub movie_override: Option<MovieOverride>,
    pub movie: MovieView,
}

fn parse_key(key: &str) -> ApiResult<ImdbId> {
    ImdbId::parse(key).ok_or_else(|| ApiError::BadRequest(format!("Invalid IMDB id '{}'", key)))
}

/// GET /override/:key
pub async fn get_override<S: SiteStore>(
    State(state): State<AppState<S>>,
    Path(key): Path<String>,
) -> ApiResult<Json<MovieOverride>> {
    let imdbid = parse_key(&key)?;
    MovieOverride::find_by_imdb(&state.store, &imdbid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No override for {}", imdbid)))
}

/// PUT /override/:key (admin)
pub async fn put_override<S: SiteStore>(
    State(state): State<AppState<S>>,
    Path(key): Path<String>,
    Extension(user): Extension<User>,
    Json(request): Json<OverrideRequest>,
) -> ApiResult<Json<OverrideResponse>> {
    let imdbid = parse_key(&key)?;

    let mut ovr = match MovieOverride::find_by_imdb(&state.store, &imdbid).await? {
        Some(mut existing) => {
            existing.name = request.name;
            existing.extdata = request.extdata;
            existing
        }
        None => MovieOverride::new(&imdbid, request.name, request.extdata),
    };
    state.store.save(&mut ovr).await?;
    info!(imdbid = %imdbid, user = %user.email, "Saved movie override");

    let movie = state.resolver().find_by_imdb(imdbid.as_str(), true).await?;

    Ok(Json(OverrideResponse {
        movie_override: Some(ovr),
        movie: MovieView::from(movie),
    }))
}

/// DELETE /override/:key (admin)
pub async fn delete_override<S: SiteStore>(
    State(state): State<AppState<S>>,
    Path(key): Path<String>,
    Extension(user): Extension<User>,
) -> ApiResult<Json<OverrideResponse>> {
    let imdbid = parse_key(&key)?;

    let ovr = MovieOverride::find_by_imdb(&state.store, &imdbid)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No override for {}", imdbid)))?;
    state.store.delete(&ovr).await?;
    info!(imdbid = %imdbid, user = %user.email, "Deleted movie override");

    let movie = state.resolver().find_by_imdb(imdbid.as_str(), true).await?;

    Ok(Json(OverrideResponse {
        movie_override: None,
        movie: MovieView::from(movie),
    }))
}
