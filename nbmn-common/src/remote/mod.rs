//! Remote movie metadata
//!
//! A [`MetadataSource`] fetches raw catalog payloads without interpreting
//! them. Failures never propagate: they come back as an error-marker payload
//! (`{"error": "..."}`) that callers detect with [`is_error_payload`].
//! [`get_movie_data`] turns whatever came back into the `extdata` stored on
//! a movie.

pub mod normalize;
pub mod omdb_client;

pub use normalize::normalize_omdb;
pub use omdb_client::{OmdbClient, Poster};

use crate::imdb::ImdbId;
use crate::models::{now_field, ExtData};
use serde_json::{Map, Value};
use std::future::Future;
use tracing::{debug, warn};

/// Decoded catalog response (a JSON object of arbitrary shape)
pub type RawPayload = Map<String, Value>;

/// Field carrying the failure description in an error-marker payload
pub const ERROR_FIELD: &str = "error";

/// OMDB's success flag ("True" / "False")
pub const RESPONSE_FIELD: &str = "Response";

/// Per-request fetch options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Ask for the Rotten Tomatoes block as well
    pub include_tomatoes: bool,
    /// Ask intermediaries not to serve a cached answer
    pub bypass_cache: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            include_tomatoes: true,
            bypass_cache: false,
        }
    }
}

impl FetchOptions {
    /// Options for an explicit refresh
    pub fn forced() -> Self {
        Self {
            bypass_cache: true,
            ..Self::default()
        }
    }
}

/// Anything that can produce a raw catalog payload for an identifier
pub trait MetadataSource: Send + Sync {
    /// Fetch the payload for `id`. Never fails: errors are returned as an
    /// error-marker payload (see [`error_payload`]).
    fn fetch(&self, id: &ImdbId, options: FetchOptions)
        -> impl Future<Output = RawPayload> + Send;
}

/// Build an error-marker payload
pub fn error_payload(message: impl Into<String>) -> RawPayload {
    let mut payload = RawPayload::new();
    payload.insert(ERROR_FIELD.to_string(), Value::String(message.into()));
    payload
}

/// The failure text when `payload` is an error marker
pub fn error_message(payload: &RawPayload) -> Option<&str> {
    match payload.get(ERROR_FIELD) {
        Some(Value::String(msg)) => Some(msg),
        Some(Value::Null) | None => None,
        Some(_) => Some("unknown error"),
    }
}

pub fn is_error_payload(payload: &RawPayload) -> bool {
    error_message(payload).is_some()
}

/// True when the catalog flagged the payload as a valid answer
pub fn is_success_response(payload: &RawPayload) -> bool {
    match payload.get(RESPONSE_FIELD) {
        Some(Value::String(flag)) => flag.trim().eq_ignore_ascii_case("true"),
        Some(Value::Bool(flag)) => *flag,
        _ => false,
    }
}

/// Fetch and normalize metadata for `id`
///
/// Returns `{"update_time": <now>, "omdb": {...}}`. Errors and negative
/// catalog answers leave `omdb` empty.
pub async fn get_movie_data<F: MetadataSource>(
    source: &F,
    id: &ImdbId,
    options: FetchOptions,
) -> ExtData {
    let raw = source.fetch(id, options).await;

    let omdb = if let Some(msg) = error_message(&raw) {
        warn!(imdbid = %id, "Metadata fetch failed: {}", msg);
        RawPayload::new()
    } else if !is_success_response(&raw) {
        debug!(imdbid = %id, "Catalog has no data");
        RawPayload::new()
    } else {
        normalize_omdb(&raw)
    };

    ExtData::from_remote(now_field(), omdb)
}
