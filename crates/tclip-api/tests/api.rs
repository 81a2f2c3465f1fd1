//! Router-level tests for the trigger surface.
//!
//! These exercise validation and liveness without touching a browser; the
//! pipeline itself is covered in tclip-pipeline.

#![cfg(unix)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use tclip_api::{create_router, ApiConfig, AppState};

fn test_router() -> axum::Router {
    // Any present executable satisfies startup validation; no fetch runs here.
    std::env::set_var("CLIP_FETCH_TOOL", "/bin/sh");

    let config = ApiConfig {
        output_root: std::env::temp_dir().join("tclip-api-tests"),
        ..ApiConfig::default()
    };
    create_router(AppState::new(config).expect("state"))
}

#[tokio::test]
async fn test_health_is_ok() {
    let app = test_router();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_empty_username_is_rejected() {
    let app = test_router();

    let request = Request::builder()
        .method("POST")
        .uri("/api/collect")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"username": "   "}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["detail"].as_str().unwrap().contains("username"));
}

#[tokio::test]
async fn test_path_like_username_is_rejected() {
    let app = test_router();

    let request = Request::builder()
        .method("POST")
        .uri("/api/collect")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"username": "../etc"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_zero_num_clips_is_rejected() {
    let app = test_router();

    let request = Request::builder()
        .method("POST")
        .uri("/api/collect")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"username": "alice", "num_clips": 0}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
