use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use memo_cli::server::{build_router, AppState};
use memo_core::config::AppConfig;
use memo_core::registry::ProviderEnv;
use serde_json::{json, Value};
use tower::ServiceExt;

fn mock_router() -> Router {
    mock_router_with(AppConfig::default())
}

fn mock_router_with(config: AppConfig) -> Router {
    let env = ProviderEnv {
        use_mock: true,
        ..Default::default()
    };
    build_router(Arc::new(AppState::new(config, env).unwrap()))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn multipart(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let boundary = "memo-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn healthz_reports_ok() {
    let (status, body) = send(mock_router(), get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn status_shows_mock_mode() {
    let (status, body) = send(mock_router(), get("/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "mock");
    assert_eq!(body["mock"]["forced"], true);
    assert_eq!(body["anthropic"]["configured"], false);
    assert_eq!(body["tts"]["language"], "en-US");
}

#[tokio::test]
async fn providers_lists_key_presence() {
    let (status, body) = send(mock_router(), get("/providers")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["keys"], json!({ "anthropic": false, "groq": false, "xai": false }));
}

#[tokio::test]
async fn analyze_rejects_blank_memo() {
    for payload in [json!({ "memo": "   " }), json!({})] {
        let (status, body) = send(mock_router(), post_json("/analyze", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No memo text provided.");
    }
}

#[tokio::test]
async fn analyze_returns_all_four_sections() {
    let memo = "Startup X raises $2M to expand its B2B payments platform.";
    let (status, body) = send(mock_router(), post_json("/analyze", json!({ "memo": memo }))).await;
    assert_eq!(status, StatusCode::OK);
    for key in [
        "executive_summary",
        "financial_analysis",
        "risks_opportunities",
        "audio_script",
    ] {
        assert!(body[key].as_str().is_some_and(|v| !v.is_empty()), "{key}");
    }
}

#[tokio::test]
async fn analyze_runs_chunked_path_for_long_memos() {
    let mut config = AppConfig::default();
    config.analysis.target_chunk_size = 100;
    config.analysis.max_chunk_size = 120;
    config.analysis.chunk_trigger_size = 150;
    let memo = ["a".repeat(90), "b".repeat(90), "c".repeat(90)].join("\n\n");

    let (status, body) = send(
        mock_router_with(config),
        post_json("/analyze", json!({ "memo": memo })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["executive_summary"]
        .as_str()
        .unwrap()
        .starts_with("This is a mock"));
}

#[tokio::test]
async fn analyze_with_unconfigured_provider_is_rejected() {
    let (status, body) = send(
        mock_router(),
        post_json("/analyze", json!({ "memo": "memo", "provider": "groq" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Requested provider groq not configured");
}

#[tokio::test]
async fn generate_audio_returns_mock_data_url() {
    let (status, body) = send(
        mock_router(),
        post_json("/generate-audio", json!({ "text": "A short script." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["audioUrl"]
        .as_str()
        .unwrap()
        .starts_with("data:audio/wav;base64,"));
    assert!(body["message"].as_str().unwrap().contains("Mock audio"));
}

#[tokio::test]
async fn generate_audio_rejects_blank_text() {
    let (status, _) = send(mock_router(), post_json("/generate-audio", json!({ "text": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_extracts_text() {
    let content = "Investment memo\n\nRevenue grew 40% year over year.";
    let (status, body) = send(mock_router(), multipart("file", "memo.txt", content.as_bytes())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["filename"], "memo.txt");
    assert_eq!(body["characters"], content.chars().count());
    assert_eq!(body["memo"], content);
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let (status, body) = send(mock_router(), multipart("other", "memo.txt", b"text")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded.");
}

#[tokio::test]
async fn upload_over_limit_is_413() {
    let mut config = AppConfig::default();
    config.upload.max_file_bytes = 16;
    let (status, _) = send(
        mock_router_with(config),
        multipart("file", "memo.txt", "x".repeat(64).as_bytes()),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn upload_of_binary_image_is_rejected() {
    let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    let (status, _) = send(mock_router(), multipart("file", "memo.png", &png)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_body_gets_json_413() {
    let mut config = AppConfig::default();
    config.server.body_limit_mb = 1;
    let memo = "m".repeat(2 * 1024 * 1024);

    let (status, body) = send(
        mock_router_with(config),
        post_json("/analyze", json!({ "memo": memo })),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({ "error": "Request too large", "limit": "1mb" }));
}
