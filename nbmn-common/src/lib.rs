//! # Nutbush Movie Night Common Library
//!
//! Shared code for the nbmn web site and maintenance tools:
//! - IMDB identifier normalization
//! - OMDB client and payload normalization
//! - Document store (SQLite) and the movie night records
//! - Movie record resolution (store, override, remote fetch)
//! - Configuration loading
//! - Slack notifications

pub mod config;
pub mod db;
pub mod error;
pub mod imdb;
pub mod models;
pub mod notify;
pub mod remote;
pub mod resolver;

pub use error::{Error, Result};
pub use imdb::{norm_imdbid, ImdbId};
pub use models::{Attendee, ExtData, Movie, MovieOverride, Night, Oligarchs, User};
pub use notify::SlackNotifier;
pub use resolver::MovieResolver;
