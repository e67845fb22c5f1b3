//! Front page: the most recent movie nights

use axum::{extract::State, Json};
use chrono::{Datelike, Local};
use nbmn_common::Night;
use serde::Serialize;
use tracing::warn;

use crate::error::ApiResult;
use crate::views::{NightView, DEFAULT_THUMB};
use crate::{AppState, SiteStore};

/// Nights shown on the front page
pub const MAX_NIGHTS: usize = 12;

#[derive(Debug, Serialize)]
pub struct MainPage {
    pub movienights: Vec<NightView>,
}

/// GET /
///
/// This year's nights, topped up from last year when there are fewer than
/// [`MAX_NIGHTS`], newest first, each with a poster thumbnail.
pub async fn main_page<S: SiteStore>(State(state): State<AppState<S>>) -> ApiResult<Json<MainPage>> {
    let year = Local::now().year();
    let mut nights = Night::find_by_year(&state.store, year).await?;
    if nights.len() < MAX_NIGHTS {
        nights.extend(Night::find_by_year(&state.store, year - 1).await?);
    }
    nights.sort_by(|a, b| b.datestr.cmp(&a.datestr));
    nights.truncate(MAX_NIGHTS);

    let resolver = state.resolver();
    let mut movienights = Vec::with_capacity(nights.len());
    for night in nights {
        let thumb = if night.imdbid.is_empty() {
            None
        } else {
            match resolver.find_by_imdb(&night.imdbid, false).await {
                Ok(movie) => movie.extdata.poster().map(str::to_string),
                Err(e) => {
                    warn!(datestr = %night.datestr, error = %e, "No movie for night");
                    None
                }
            }
        };

        let mut view = NightView::from(night);
        view.thumb = Some(thumb.unwrap_or_else(|| DEFAULT_THUMB.to_string()));
        movienights.push(view);
    }

    Ok(Json(MainPage { movienights }))
}
