//! Transcribe API Tests
//!
//! Drive the full router with `oneshot`: in-memory object store, scripted job
//! service, and result documents served by a mock HTTP server.

mod mock_services;

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use object_store::ObjectStore;
use object_store::path::Path as ObjectPath;
use serde_json::{Value, json};
use std::time::Duration;
use tower::util::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mock_services::{
    harness, harness_with_config, harness_with_tokio_clock, test_config, transcript_document,
};
use transcribe_proxy::core::jobs::JobRecord;
use transcribe_proxy::routes;

fn transcribe_request(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/transcribe")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn result_server(body: String) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/results/job.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_transcribe_success() {
    let server = result_server(transcript_document("I like hiking.", &["0.92"])).await;
    let h = harness(vec![
        JobRecord::in_progress(),
        JobRecord::in_progress(),
        JobRecord::completed(format!("{}/results/job.json", server.uri())),
    ]);
    let app = routes::create_app(h.state.clone());

    let audio = b"\x1aE\xdf\xa3 webm bytes";
    let response = app
        .oneshot(transcribe_request(json!({
            "audio_data": STANDARD.encode(audio),
            "session_id": "abc",
            "language_code": "en-US"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["transcript"], "I like hiking.");
    assert!((body["confidence"].as_f64().unwrap() - 0.92).abs() < 1e-9);

    let job_name = body["job_name"].as_str().unwrap();
    let suffix = job_name.strip_prefix("opic-abc-").unwrap();
    assert_eq!(suffix.len(), 8);

    let started = h.jobs.started();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].job_name, job_name);
    assert_eq!(
        started[0].media_uri,
        format!("s3://opic-temp-audio/temp/{job_name}.webm")
    );
    assert_eq!(h.jobs.checks(), 3);
    assert_eq!(h.sleeper.total(), Duration::from_secs(6));

    // Temp object is gone once the response is produced
    let key = ObjectPath::from(format!("temp/{job_name}.webm"));
    assert!(h.memory.head(&key).await.is_err());
}

#[tokio::test]
async fn test_transcribe_default_language() {
    let server = result_server(transcript_document("hello", &["0.8", "0.6"])).await;
    let h = harness(vec![JobRecord::completed(format!(
        "{}/results/job.json",
        server.uri()
    ))]);
    let app = routes::create_app(h.state.clone());

    let response = app
        .oneshot(transcribe_request(json!({
            "audio_data": STANDARD.encode(b"audio"),
            "session_id": "s-1"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!((body["confidence"].as_f64().unwrap() - 0.7).abs() < 1e-9);
    assert_eq!(h.jobs.started()[0].language_code, "en-US");
}

#[tokio::test]
async fn test_invalid_base64_is_bad_request() {
    let h = harness(Vec::new());
    let app = routes::create_app(h.state.clone());

    let response = app
        .oneshot(transcribe_request(json!({
            "audio_data": "not base64!!",
            "session_id": "abc"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("base64"));
    assert!(h.jobs.started().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let h = harness(Vec::new());
    let app = routes::create_app(h.state.clone());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/transcribe")
        .header("content-type", "application/json")
        .body(Body::from("{\"audio_data\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn test_missing_session_id_is_bad_request() {
    let h = harness(Vec::new());
    let app = routes::create_app(h.state.clone());

    let response = app
        .oneshot(transcribe_request(json!({
            "audio_data": STANDARD.encode(b"audio")
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(h.jobs.started().is_empty());
}

#[tokio::test]
async fn test_job_failure_is_server_error() {
    let h = harness(vec![JobRecord::failed("bad audio")]);
    let app = routes::create_app(h.state.clone());

    let response = app
        .oneshot(transcribe_request(json!({
            "audio_data": STANDARD.encode(b"audio"),
            "session_id": "abc"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Transcription failed: bad audio");
    assert_eq!(h.jobs.checks(), 1);
}

#[tokio::test]
async fn test_timeout_is_gateway_timeout() {
    let h = harness(Vec::new());
    let app = routes::create_app(h.state.clone());

    let response = app
        .oneshot(transcribe_request(json!({
            "audio_data": STANDARD.encode(b"audio"),
            "session_id": "abc"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Transcription timeout after 90 seconds");
    assert_eq!(h.jobs.checks(), 30);
    assert!(h.sleeper.total() <= Duration::from_secs(93));

    let job_name = &h.jobs.started()[0].job_name;
    let key = ObjectPath::from(format!("temp/{job_name}.webm"));
    assert!(h.memory.head(&key).await.is_err());
}

#[tokio::test]
async fn test_unreadable_result_is_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    let h = harness(vec![JobRecord::completed(format!(
        "{}/results/job.json",
        server.uri()
    ))]);
    let app = routes::create_app(h.state.clone());

    let response = app
        .oneshot(transcribe_request(json!({
            "audio_data": STANDARD.encode(b"audio"),
            "session_id": "abc"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_error_responses_carry_cors_headers() {
    let h = harness(Vec::new());
    let app = routes::create_app(h.state.clone());

    let response = app
        .oneshot(transcribe_request(json!({
            "audio_data": "%%%",
            "session_id": "abc"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
    assert_eq!(
        headers["access-control-allow-headers"],
        "Content-Type, X-Api-Key"
    );
}

#[tokio::test]
async fn test_preflight_request() {
    let h = harness(Vec::new());
    let app = routes::create_app(h.state.clone());

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/transcribe")
        .header("origin", "https://app.example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert!(response.headers().contains_key("access-control-allow-methods"));
    assert!(h.jobs.started().is_empty());
}

#[tokio::test]
async fn test_body_limit() {
    let mut config = test_config();
    config.max_body_bytes = 64;
    let h = harness_with_config(config, Vec::new());
    let app = routes::create_app(h.state.clone());

    let response = app
        .oneshot(transcribe_request(json!({
            "audio_data": STANDARD.encode([0u8; 256]),
            "session_id": "abc"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("application/json"));
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    let body = json_body(response).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Request body too large")
    );
    assert!(h.jobs.started().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_client_disconnect_still_removes_temp_object() {
    let h = harness_with_tokio_clock(Vec::new());
    let app = routes::create_app(h.state.clone());

    // Caller gives up while the job is still being polled
    let outcome = tokio::time::timeout(
        Duration::from_secs(10),
        app.oneshot(transcribe_request(json!({
            "audio_data": STANDARD.encode(b"audio"),
            "session_id": "abc"
        }))),
    )
    .await;
    assert!(outcome.is_err());

    let job_name = h.jobs.started()[0].job_name.clone();
    let key = ObjectPath::from(format!("temp/{job_name}.webm"));
    assert!(h.memory.head(&key).await.is_ok());

    tokio::time::sleep(Duration::from_secs(200)).await;

    assert_eq!(h.jobs.checks(), 30);
    assert!(h.memory.head(&key).await.is_err());
}

#[tokio::test]
async fn test_health_check() {
    let h = harness(Vec::new());
    let app = routes::create_app(h.state.clone());

    let request = Request::builder()
        .uri("/")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "OK");
}
