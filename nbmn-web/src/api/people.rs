//! Attendee pages

use axum::{
    extract::{Path, State},
    Json,
};
use nbmn_common::models::title_case;
use nbmn_common::{Attendee, Night};
use serde::Serialize;
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::views::{NightView, PersonView};
use crate::{AppState, SiteStore};

#[derive(Debug, Serialize)]
pub struct PersonPage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persons: Option<Vec<Attendee>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<PersonView>,
    pub person_name: String,
}

/// GET /person
pub async fn list_people<S: SiteStore>(State(state): State<AppState<S>>) -> ApiResult<Json<PersonPage>> {
    let mut persons: Vec<Attendee> = state.store.find_all().await?;
    state.oligarchs.sort(&mut persons);

    Ok(Json(PersonPage {
        persons: Some(persons),
        person: None,
        person_name: "Listing Them All!".to_string(),
    }))
}

/// GET /person/:name
pub async fn show_person<S: SiteStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> ApiResult<Json<PersonPage>> {
    let mut found = Attendee::find_by_name(&state.store, &name).await?;
    if found.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No attendee named {} could be found",
            name
        )));
    }
    if found.len() > 1 {
        warn!(name = %name, "More than one person found");
    }
    let attendee = found.swap_remove(0);

    let mut nights: Vec<Night> = state
        .store
        .find_all::<Night>()
        .await?
        .into_iter()
        .filter(|n| n.has_attendee(&name))
        .collect();
    nights.sort_by(|a, b| b.datestr.cmp(&a.datestr));

    let img = person_image(&state, &attendee.name);

    Ok(Json(PersonPage {
        persons: None,
        person_name: title_case(&attendee.name),
        person: Some(PersonView {
            urlname: attendee.urlname().to_string(),
            attendee,
            nights: nights.into_iter().map(NightView::from).collect(),
            img,
        }),
    }))
}

/// `/static/people/<name>.jpg` when that file exists, else the default image
fn person_image<S>(state: &AppState<S>, name: &str) -> String {
    let file = format!("{}.jpg", name.to_lowercase());
    if state.static_dir.join("people").join(&file).is_file() {
        format!("/static/people/{}", file)
    } else {
        "/static/people/default.jpg".to_string()
    }
}
