//! Raw data dump for client-side exploration

use axum::{extract::State, Json};
use nbmn_common::{Attendee, Movie, Night};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::ApiResult;
use crate::{AppState, SiteStore};

#[derive(Debug, Serialize)]
pub struct DataDump {
    pub attendees: Vec<Attendee>,
    pub nights: Vec<Night>,
    /// Keyed by IMDB id
    pub movies: BTreeMap<String, Movie>,
}

/// GET /gimme
pub async fn data_dump<S: SiteStore>(State(state): State<AppState<S>>) -> ApiResult<Json<DataDump>> {
    let attendees: Vec<Attendee> = state.store.find_all().await?;
    let nights: Vec<Night> = state.store.find_all().await?;
    let movies = state
        .store
        .find_all::<Movie>()
        .await?
        .into_iter()
        .map(|m| (m.imdbid.clone(), m))
        .collect();

    Ok(Json(DataDump {
        attendees,
        nights,
        movies,
    }))
}
