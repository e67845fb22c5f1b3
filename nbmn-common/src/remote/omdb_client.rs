//! OMDB API client
//!
//! The client is built from [`OmdbConfig`]; a missing API key fails
//! construction so any code path that fetches finds out at startup.

use super::{error_payload, FetchOptions, MetadataSource, RawPayload};
use crate::config::OmdbConfig;
use crate::imdb::ImdbId;
use crate::{Error, Result};
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("nbmn/", env!("CARGO_PKG_VERSION"));

/// Content type assumed when the poster endpoint does not send one
pub const DEFAULT_POSTER_TYPE: &str = "image/jpeg";

/// Poster image as served by the poster endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poster {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// OMDB title and poster client
#[derive(Clone)]
pub struct OmdbClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    poster_url: String,
}

impl OmdbClient {
    pub fn new(config: &OmdbConfig) -> Result<Self> {
        let api_key = config.api_key()?.to_string();

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| Error::Remote(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: config.base_url.clone(),
            poster_url: config.poster_url.clone(),
        })
    }

    /// Look up one title
    pub async fn lookup_title(&self, id: &ImdbId, options: FetchOptions) -> Result<RawPayload> {
        let tomatoes = if options.include_tomatoes { "true" } else { "false" };

        debug!(imdbid = %id, tomatoes, "Querying OMDB");

        let mut request = self.http_client.get(&self.base_url).query(&[
            ("apikey", self.api_key.as_str()),
            ("i", id.as_str()),
            ("r", "json"),
            ("tomatoes", tomatoes),
            ("plot", "short"),
        ]);
        if options.bypass_cache {
            request = request.header(CACHE_CONTROL, "no-cache");
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Remote(format!("OMDB request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Remote(format!(
                "OMDB returned {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Remote(format!("OMDB parse error: {}", e)))?;

        match body {
            Value::Object(payload) => Ok(payload),
            other => Err(Error::Remote(format!(
                "OMDB returned a non-object payload: {}",
                other
            ))),
        }
    }

    /// Download the poster image for `id`
    pub async fn fetch_poster(&self, id: &ImdbId) -> Result<Poster> {
        let response = self
            .http_client
            .get(&self.poster_url)
            .query(&[("apikey", self.api_key.as_str()), ("i", id.as_str())])
            .send()
            .await
            .map_err(|e| Error::Remote(format!("Poster request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("No poster for {}", id)));
        }
        if !status.is_success() {
            return Err(Error::Remote(format!(
                "Poster endpoint returned {}",
                status.as_u16()
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_POSTER_TYPE)
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Remote(format!("Poster download failed: {}", e)))?;
        Ok(Poster {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}

impl MetadataSource for OmdbClient {
    async fn fetch(&self, id: &ImdbId, options: FetchOptions) -> RawPayload {
        match self.lookup_title(id, options).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(imdbid = %id, error = %e, "OMDB lookup failed");
                error_payload(e.to_string())
            }
        }
    }
}
