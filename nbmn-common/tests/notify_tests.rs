//! Slack notifier tests against a local stand-in webhook

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use nbmn_common::config::SlackConfig;
use nbmn_common::SlackNotifier;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

type Received = Arc<Mutex<Vec<Value>>>;

async fn accept(State(received): State<Received>, Json(body): Json<Value>) -> StatusCode {
    received.lock().unwrap().push(body);
    StatusCode::OK
}

async fn reject(State(received): State<Received>, Json(body): Json<Value>) -> StatusCode {
    received.lock().unwrap().push(body);
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Start the stand-in webhook; returns its base URL and the posted bodies
async fn start_hook() -> (String, Received) {
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/ok", post(accept))
        .route("/fail", post(reject))
        .with_state(received.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), received)
}

fn notifier(hook: String) -> SlackNotifier {
    SlackNotifier::new(SlackConfig {
        hook,
        channel: "#movies".to_string(),
        username: "Night Bot".to_string(),
        icon_emoji: ":popcorn:".to_string(),
    })
}

#[tokio::test]
async fn test_notify_posts_message() {
    let (base, received) = start_hook().await;
    let notifier = notifier(format!("{}/ok", base));

    assert!(notifier.notify("Movie night *Heat* was added").await);

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    let body = &received[0];
    assert_eq!(body["channel"], "#movies");
    assert_eq!(body["username"], "Night Bot");
    assert_eq!(body["icon_emoji"], ":popcorn:");
    assert_eq!(body["mrkdwn"], true);
    assert_eq!(body["text"], "Movie night *Heat* was added");
}

#[tokio::test]
async fn test_notify_reports_rejection() {
    let (base, received) = start_hook().await;
    let notifier = notifier(format!("{}/fail", base));

    assert!(!notifier.notify("Movie night deleted").await);
    assert_eq!(received.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_notify_unreachable_hook() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let notifier = notifier(format!("http://{}/ok", addr));
    assert!(!notifier.notify("nobody home").await);
}
