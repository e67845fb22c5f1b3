//! JSON page models
//!
//! Records plus the display values the client needs (formatted dates, URL
//! names, thumbnails).

use nbmn_common::{Attendee, Movie, Night};
use serde::Serialize;

/// Thumbnail used when a movie has no poster
pub const DEFAULT_THUMB: &str = "/static/default_movie_thumb.png";

#[derive(Debug, Serialize)]
pub struct NightView {
    #[serde(flatten)]
    pub night: Night,
    pub listdate: String,
    pub listdate_short: String,
    pub listdate_js: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
}

impl From<Night> for NightView {
    fn from(night: Night) -> Self {
        Self {
            listdate: night.listdate(),
            listdate_short: night.listdate_short(),
            listdate_js: night.listdate_js(),
            thumb: None,
            night,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieView {
    #[serde(flatten)]
    pub movie: Movie,
    pub urlname: String,
}

impl From<Movie> for MovieView {
    fn from(movie: Movie) -> Self {
        Self {
            urlname: movie.imdbid.clone(),
            movie,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PersonView {
    #[serde(flatten)]
    pub attendee: Attendee,
    pub urlname: String,
    /// Nights attended, newest first
    pub nights: Vec<NightView>,
    /// Image path under the site root
    pub img: String,
}

/// Attendee entry on the night editor
#[derive(Debug, Serialize)]
pub struct EditAttendee {
    pub name: String,
    pub checked: bool,
}
