//! Integration tests for `ApiPoller` and a full poll cycle against an
//! in-process fake of the homework status API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use homework_common::config::Credentials;
use homework_common::error::{HomeworkError, Result};
use homework_common::types::HomeworkStatus;
use homework_notifier::Notifier;
use homework_poller::api::{ApiPoller, StatusSource};
use homework_poller::poll_loop::{CycleOutcome, PollLoop};

// ============================================================
// Fake homework API
// ============================================================

/// A request as the fake API saw it: `(authorization header, from_date)`.
type SeenRequest = (Option<String>, Option<String>);

#[derive(Clone)]
struct FakeApi {
    status: StatusCode,
    body: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

async fn homework_statuses(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    api.seen
        .lock()
        .unwrap()
        .push((auth, params.get("from_date").cloned()));
    (api.status, api.body.clone()).into_response()
}

/// Start the fake API and return its endpoint URL plus the request log.
async fn spawn_fake_api(status: StatusCode, body: impl Into<String>) -> (String, FakeApi) {
    let api = FakeApi {
        status,
        body: body.into(),
        seen: Arc::default(),
    };
    let app = Router::new()
        .route("/api/user_api/homework_statuses/", get(homework_statuses))
        .with_state(api.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (
        format!("http://{}/api/user_api/homework_statuses/", addr),
        api,
    )
}

fn credentials() -> Credentials {
    Credentials {
        practicum_token: "practicum-secret".to_string(),
        telegram_token: "unused".to_string(),
        telegram_chat_id: "unused".to_string(),
    }
}

fn poller(endpoint: String) -> ApiPoller {
    ApiPoller::new(endpoint, &credentials(), Duration::from_secs(5)).unwrap()
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

// ============================================================
// ApiPoller
// ============================================================

#[tokio::test]
async fn test_fetch_sends_oauth_header_and_cursor() {
    let payload = json!({"homeworks": [], "current_date": 1_700_000_200});
    let (endpoint, api) = spawn_fake_api(StatusCode::OK, payload.to_string()).await;

    let body = poller(endpoint).fetch(1_700_000_000).await.unwrap();

    assert_eq!(body, payload);
    let seen = api.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0.as_deref(), Some("OAuth practicum-secret"));
    assert_eq!(seen[0].1.as_deref(), Some("1700000000"));
}

#[tokio::test]
async fn test_zero_cursor_is_replaced_with_now() {
    let (endpoint, api) = spawn_fake_api(StatusCode::OK, r#"{"homeworks": []}"#).await;
    let before = chrono::Utc::now().timestamp();

    poller(endpoint).fetch(0).await.unwrap();

    let seen = api.seen.lock().unwrap();
    let from_date: i64 = seen[0].1.as_deref().unwrap().parse().unwrap();
    assert!(from_date >= before);
}

#[tokio::test]
async fn test_error_status_is_api_unavailable() {
    let (endpoint, _api) = spawn_fake_api(StatusCode::SERVICE_UNAVAILABLE, "maintenance").await;

    match poller(endpoint).fetch(1_700_000_000).await {
        Err(HomeworkError::ApiUnavailable { status }) => assert_eq!(status, 503),
        other => panic!("expected ApiUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let (endpoint, _api) = spawn_fake_api(StatusCode::OK, "<html>oops</html>").await;

    assert!(matches!(
        poller(endpoint).fetch(1_700_000_000).await,
        Err(HomeworkError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_unreachable_api_is_transport_error() {
    // Nothing listens on the discard port.
    let unreachable = poller("http://127.0.0.1:9/api/user_api/homework_statuses/".to_string());

    assert!(matches!(
        unreachable.fetch(1_700_000_000).await,
        Err(HomeworkError::Transport(_))
    ));
}

// ============================================================
// Full cycle over HTTP
// ============================================================

#[tokio::test]
async fn test_cycle_notifies_approved_homework() {
    let payload = json!({
        "homeworks": [{"homework_name": "hw1", "status": "approved"}],
        "current_date": 1_700_000_100
    });
    let (endpoint, _api) = spawn_fake_api(StatusCode::OK, payload.to_string()).await;
    let notifier = Arc::new(RecordingNotifier::default());

    let mut poll_loop = PollLoop::new(
        Arc::new(poller(endpoint)),
        notifier.clone(),
        Duration::from_secs(600),
        CancellationToken::new(),
    )
    .with_cursor(1_700_000_000);

    let outcome = poll_loop.run_cycle().await.unwrap();

    let sent = notifier.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("hw1"));
    assert!(sent[0].contains(HomeworkStatus::Approved.verdict()));
    assert_eq!(outcome, CycleOutcome::Notified(sent[0].clone()));
    assert_eq!(poll_loop.cursor(), 1_700_000_100);
}

#[tokio::test]
async fn test_cycle_keeps_cursor_when_api_is_down() {
    let (endpoint, api) = spawn_fake_api(StatusCode::SERVICE_UNAVAILABLE, "").await;
    let notifier = Arc::new(RecordingNotifier::default());

    let mut poll_loop = PollLoop::new(
        Arc::new(poller(endpoint)),
        notifier.clone(),
        Duration::from_secs(600),
        CancellationToken::new(),
    )
    .with_cursor(1_700_000_000);

    assert!(poll_loop.run_cycle().await.is_err());
    assert!(poll_loop.run_cycle().await.is_err());

    assert_eq!(poll_loop.cursor(), 1_700_000_000);
    let seen = api.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|(_, from)| from.as_deref() == Some("1700000000")));
    assert!(notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_reads_json_content_type_reply() {
    let app = Router::new().route(
        "/api/user_api/homework_statuses/",
        get(|| async { Json(json!({"homeworks": [], "current_date": 5})) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let body: Value = poller(format!("http://{}/api/user_api/homework_statuses/", addr))
        .fetch(1)
        .await
        .unwrap();
    assert_eq!(body["current_date"], 5);
}
