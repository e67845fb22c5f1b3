//! Movie night pages and the night editor

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Extension, Form, Json,
};
use nbmn_common::models::title_case;
use nbmn_common::{Attendee, Night, User};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::views::{EditAttendee, NightView};
use crate::{AppState, SiteStore};

/// Path segment that stands for "a new night"
const ADD_KEY: &str = "add";

#[derive(Debug, Default, Deserialize)]
pub struct NightQuery {
    pub mode: Option<String>,
}

impl NightQuery {
    fn mode(&self) -> String {
        self.mode.as_deref().unwrap_or_default().trim().to_lowercase()
    }
}

#[derive(Debug, Serialize)]
pub struct NightPage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movienights: Option<Vec<NightView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movienight: Option<NightView>,
    pub movie_night_name: String,
}

/// Editor model: the night plus every known attendee
#[derive(Debug, Serialize)]
pub struct NightEditPage {
    pub movienight: NightView,
    pub mode: String,
    pub attendees: Vec<EditAttendee>,
}

/// GET /night
pub async fn list_nights<S: SiteStore>(State(state): State<AppState<S>>) -> ApiResult<Json<NightPage>> {
    let mut nights: Vec<Night> = state.store.find_all().await?;
    nights.sort_by(|a, b| a.datestr.cmp(&b.datestr));

    Ok(Json(NightPage {
        movienights: Some(nights.into_iter().map(NightView::from).collect()),
        movienight: None,
        movie_night_name: "ALL Movie Nights".to_string(),
    }))
}

/// GET /night/:datestr[?mode=add|edit]
///
/// Without a mode this is the night itself; with one (or for `/night/add`)
/// it is the editor model.
pub async fn show_night<S: SiteStore>(
    State(state): State<AppState<S>>,
    Path(datestr): Path<String>,
    Query(query): Query<NightQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let mode = query.mode();
    let adding = datestr.eq_ignore_ascii_case(ADD_KEY) || mode == "add";

    if mode.is_empty() && !adding {
        let mut night = Night::find_datestr(&state.store, &datestr)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("No movie night for {}", datestr)))?;
        state.oligarchs.sort(&mut night.attendees);

        let page = NightPage {
            movienights: None,
            movie_night_name: night.moviename.clone(),
            movienight: Some(NightView::from(night)),
        };
        return Ok(Json(to_value(&page)?));
    }

    let (night, mode) = if adding {
        let mut night = Night::new("now");
        night.attendees = state.oligarchs.names().map(str::to_string).collect();
        (night, "add")
    } else {
        let night = Night::find_datestr(&state.store, &datestr)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("No movie night for {}", datestr)))?;
        (night, "edit")
    };

    let page = edit_page(&state, night, mode).await?;
    Ok(Json(to_value(&page)?))
}

/// POST /night/:datestr?mode=add|edit (admin)
///
/// Form fields: `moviedate`, `moviename`, `movieimdbid`, `moviemeal`,
/// `moviecomments`, `oldhat_*` (one per checked attendee),
/// `newattendees` (comma separated) and `dodel` (delete when editing).
pub async fn save_night<S: SiteStore>(
    State(state): State<AppState<S>>,
    Path(datestr): Path<String>,
    Query(query): Query<NightQuery>,
    Extension(user): Extension<User>,
    Form(form): Form<HashMap<String, String>>,
) -> ApiResult<Redirect> {
    let mode = query.mode();
    if datestr.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "No movie night specified for save".to_string(),
        ));
    }
    let adding = datestr.eq_ignore_ascii_case(ADD_KEY) || mode == "add";
    if mode.is_empty() && !adding {
        return Err(ApiError::BadRequest(format!(
            "Invalid movie night state for save: mode='{}', ds='{}'",
            mode, datestr
        )));
    }

    let field = |name: &str| form.get(name).map(|v| v.trim().to_string()).unwrap_or_default();

    // The URL names the night being edited; the form may move it to a new date
    let user_datestr = field("moviedate");
    let (mut night, mode) = if adding {
        let date = if user_datestr.is_empty() { "now" } else { user_datestr.as_str() };
        (Night::new(date), "add")
    } else {
        let night = Night::find_datestr(&state.store, &datestr)
            .await?
            .ok_or_else(|| {
                ApiError::BadRequest("Attempt to edit non-existent movie night".to_string())
            })?;

        if !field("dodel").is_empty() {
            info!(datestr = %datestr, user = %user.email, "Delete requested for night");
            state.store.delete(&night).await?;
            state
                .notifier
                .notify(&format!(
                    "Movie night {} ({}) was deleted by {}",
                    night.listdate(),
                    night.moviename,
                    user.name
                ))
                .await;
            return Ok(Redirect::to("/"));
        }
        (night, "edit")
    };

    if !user_datestr.is_empty() {
        night.datestr = Night::str_from_date(&user_datestr);
    }
    night.moviename = field("moviename");
    night.imdbid = field("movieimdbid");
    night.dinner = field("moviemeal");
    night.comments = field("moviecomments");
    night.attendees = form_attendees(&form);
    night.insure_data();

    state
        .oligarchs
        .ensure_attendees(&state.store, &night.attendees)
        .await?;

    let messages = night.validate();
    if !messages.is_empty() {
        let page = edit_page(&state, night, mode).await?;
        return Err(ApiError::Validation {
            messages,
            model: to_value(&page)?,
        });
    }

    state.store.save(&mut night).await?;
    info!(datestr = %night.datestr, user = %user.email, mode, "Saved movie night");

    let verb = if mode == "add" { "added" } else { "updated" };
    state
        .notifier
        .notify(&format!(
            "Movie night {}: *{}* was {} by {}",
            night.listdate(),
            night.moviename,
            verb,
            user.name
        ))
        .await;

    Ok(Redirect::to(&format!("/night/{}", night.datestr)))
}

/// Checked (`oldhat_*`) plus new (comma separated) attendees, title-cased,
/// de-duplicated and sorted
pub fn form_attendees(form: &HashMap<String, String>) -> Vec<String> {
    let checked = form
        .iter()
        .filter(|(k, v)| k.starts_with("oldhat_") && !v.trim().is_empty())
        .map(|(_, v)| title_case(v.trim()));

    let added = form
        .get("newattendees")
        .map(String::as_str)
        .unwrap_or_default()
        .split(',')
        .map(|a| title_case(a.trim()));

    checked
        .chain(added)
        .filter(|a| !a.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

async fn edit_page<S: SiteStore>(
    state: &AppState<S>,
    night: Night,
    mode: &str,
) -> ApiResult<NightEditPage> {
    let mut attendees: Vec<Attendee> = state.store.find_all().await?;
    state.oligarchs.sort(&mut attendees);

    let attendees = attendees
        .into_iter()
        .map(|a| EditAttendee {
            checked: night.attendees.contains(&a.name) || state.oligarchs.contains(&a.name),
            name: a.name,
        })
        .collect();

    Ok(NightEditPage {
        movienight: NightView::from(night),
        mode: mode.to_string(),
        attendees,
    })
}

fn to_value<T: Serialize>(page: &T) -> ApiResult<serde_json::Value> {
    serde_json::to_value(page).map_err(|e| ApiError::Internal(format!("Serialize page: {}", e)))
}
