//! OMDB client tests against a local stand-in server
//!
//! A throwaway axum server on 127.0.0.1 answers the title and poster
//! endpoints so the real request path (query string, headers, decoding,
//! error conversion) is exercised without network access.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use nbmn_common::config::OmdbConfig;
use nbmn_common::remote::{
    get_movie_data, is_error_payload, FetchOptions, MetadataSource, OmdbClient,
};
use nbmn_common::{Error, ImdbId};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Default)]
struct Seen {
    params: Vec<HashMap<String, String>>,
    cache_control: Vec<Option<String>>,
}

type Shared = Arc<Mutex<Seen>>;

async fn title(
    State(seen): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let id = params.get("i").cloned().unwrap_or_default();
    {
        let mut seen = seen.lock().unwrap();
        seen.cache_control.push(
            headers
                .get("cache-control")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );
        seen.params.push(params);
    }

    match id.as_str() {
        "tt0000001" => (
            StatusCode::OK,
            Json(json!({
                "Response": "True",
                "Title": "Foo",
                "Actors": "A, B, C",
                "Director": "N/A",
                "Poster": "N/A",
                "imdbRating": "7.9",
                "imdbVotes": "1,024",
                "Metascore": "N/A"
            })),
        )
            .into_response(),
        "tt0000002" => (
            StatusCode::OK,
            Json(json!({"Response": "False", "Error": "Incorrect IMDb ID."})),
        )
            .into_response(),
        "tt0000003" => (StatusCode::OK, "<html>not json</html>").into_response(),
        "tt0000004" => (StatusCode::OK, Json(json!(["not", "an", "object"]))).into_response(),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
    }
}

async fn poster(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    match params.get("i").map(String::as_str) {
        Some("tt0000001") => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/png")],
            vec![0x89u8, 0x50, 0x4E, 0x47],
        )
            .into_response(),
        Some("tt0000002") => (StatusCode::OK, vec![0xFFu8, 0xD8, 0xFF]).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Start the stand-in server; returns its base URL and the request log
async fn start_stub() -> (String, Shared) {
    let seen: Shared = Arc::new(Mutex::new(Seen::default()));
    let app = Router::new()
        .route("/", get(title))
        .route("/poster", get(poster))
        .with_state(seen.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), seen)
}

fn client_for(base: &str) -> OmdbClient {
    OmdbClient::new(&OmdbConfig {
        api_key: "test-key".to_string(),
        base_url: format!("{}/", base),
        poster_url: format!("{}/poster", base),
        timeout_secs: Some(5),
    })
    .unwrap()
}

fn id(n: u32) -> ImdbId {
    ImdbId::parse(n).unwrap()
}

#[tokio::test]
async fn test_fetch_sends_expected_query() {
    let (base, seen) = start_stub().await;
    let client = client_for(&base);

    let payload = client.fetch(&id(1), FetchOptions::default()).await;
    assert_eq!(payload["Title"], "Foo");
    // Raw payloads are not interpreted
    assert_eq!(payload["Actors"], "A, B, C");

    let seen = seen.lock().unwrap();
    let params = &seen.params[0];
    assert_eq!(params["apikey"], "test-key");
    assert_eq!(params["i"], "tt0000001");
    assert_eq!(params["r"], "json");
    assert_eq!(params["tomatoes"], "true");
    assert_eq!(params["plot"], "short");
    assert_eq!(seen.cache_control[0], None);
}

#[tokio::test]
async fn test_fetch_options_are_applied() {
    let (base, seen) = start_stub().await;
    let client = client_for(&base);

    let options = FetchOptions {
        include_tomatoes: false,
        bypass_cache: true,
    };
    client.fetch(&id(1), options).await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.params[0]["tomatoes"], "false");
    assert_eq!(seen.cache_control[0].as_deref(), Some("no-cache"));
}

#[tokio::test]
async fn test_failures_become_error_markers() {
    let (base, _seen) = start_stub().await;
    let client = client_for(&base);

    // malformed JSON, non-object JSON, server error
    for n in [3, 4, 5] {
        let payload = client.fetch(&id(n), FetchOptions::default()).await;
        assert!(is_error_payload(&payload), "id {} gave {:?}", n, payload);
    }

    let err = client.lookup_title(&id(5), FetchOptions::default()).await;
    assert!(matches!(err, Err(Error::Remote(_))));
}

#[tokio::test]
async fn test_unreachable_server_is_an_error_marker() {
    // Bind then drop a listener to get a port nothing is serving
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{}", addr));
    let payload = client.fetch(&id(1), FetchOptions::default()).await;
    assert!(is_error_payload(&payload));
}

#[tokio::test]
async fn test_get_movie_data_normalizes_live_payload() {
    let (base, _seen) = start_stub().await;
    let client = client_for(&base);

    let data = get_movie_data(&client, &id(1), FetchOptions::default()).await;
    let omdb = data.omdb().unwrap();
    assert_eq!(omdb["Actors"], json!(["A", "B", "C"]));
    assert_eq!(omdb["Director"], json!([]));
    assert_eq!(omdb["Poster"], json!(""));
    assert_eq!(omdb["imdbRating"], json!(7.9));
    assert_eq!(omdb["imdbVotes"], json!(1024));
    assert_eq!(omdb["Metascore"], json!("NaN"));
    assert_eq!(data.title(), Some("Foo"));

    // Negative answer from the catalog -> empty catalog object
    let missing = get_movie_data(&client, &id(2), FetchOptions::default()).await;
    assert_eq!(missing.get("omdb"), Some(&Value::Object(Default::default())));
}

#[tokio::test]
async fn test_fetch_poster() {
    let (base, _seen) = start_stub().await;
    let client = client_for(&base);

    let poster = client.fetch_poster(&id(1)).await.unwrap();
    assert_eq!(poster.content_type, "image/png");
    assert_eq!(poster.bytes, vec![0x89, 0x50, 0x4E, 0x47]);

    // axum labels a bare byte body application/octet-stream
    let poster = client.fetch_poster(&id(2)).await.unwrap();
    assert_eq!(poster.content_type, "application/octet-stream");
    assert_eq!(poster.bytes, vec![0xFF, 0xD8, 0xFF]);

    let missing = client.fetch_poster(&id(9)).await;
    assert!(matches!(missing, Err(Error::NotFound(_))));
}
