//! Router tests driven through `tower::ServiceExt::oneshot`.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use dashboard::build_router;
use dashboard::state::AppState;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower::ServiceExt;

use common::test_forecaster;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

fn app() -> Router {
    let handle = PrometheusBuilder::new().build_recorder().handle();
    build_router(Arc::new(AppState::new(test_forecaster())), handle)
}

async fn get(uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, body.to_vec())
}

async fn get_text(uri: &str) -> (StatusCode, String) {
    let (status, _, body) = get(uri).await;
    (status, String::from_utf8(body).unwrap())
}

// ============================================================================
// Pages
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (status, body) = get_text("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_home_page() {
    let (status, content_type, _) = get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
}

#[tokio::test]
async fn test_demo_page_defaults_to_custom_time() {
    let (status, body) = get_text("/demo").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Predict Weather"));
    assert!(!body.contains("/figures/predictions.png"));
}

#[tokio::test]
async fn test_demo_page_launch_shows_figures() {
    let (status, body) = get_text("/demo?scenario=crew2demo").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/figures/predictions.png"));
    assert!(body.contains("/figures/labels.png"));
    assert!(!body.contains("Predict Weather"));
}

#[tokio::test]
async fn test_demo_page_custom_predict() {
    let (status, body) = get_text("/demo?date=2021-07-04&time=06:30&predict=true").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("date=2021-07-04"));
    assert!(body.contains("/figures/predictions.png"));
}

#[tokio::test]
async fn test_demo_page_invalid_time() {
    let (status, body) = get_text("/demo?time=18:80&predict=true").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_demo_page_unknown_scenario() {
    let (status, _) = get_text("/demo?scenario=apollo").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Figures
// ============================================================================

#[tokio::test]
async fn test_figure_png() {
    for name in ["inputs.png", "predictions.png", "labels.png"] {
        let uri = format!("/figures/{}?date=2020-09-30&time=18:00", name);
        let (status, content_type, body) = get(&uri).await;
        assert_eq!(status, StatusCode::OK, "{}", name);
        assert_eq!(content_type.as_deref(), Some("image/png"));
        assert_eq!(&body[..8], &PNG_SIGNATURE);
    }
}

#[tokio::test]
async fn test_figure_unknown_kind() {
    let (status, _, _) = get("/figures/bogus.png?date=2020-09-30&time=18:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_figure_unknown_model() {
    let (status, _, _) = get("/figures/predictions.png?model=metnet&date=2020-09-30&time=18:00").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// JSON API
// ============================================================================

#[tokio::test]
async fn test_session_api() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/session")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"event":{"type":"select_scenario","value":"starlink12"}}"#,
        ))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["scenario"], "starlink12");
    assert_eq!(json["date"], "2020-05-10");
    assert_eq!(json["time"], "18:00");
    assert!(json["predictions"].is_object());
}

#[tokio::test]
async fn test_models_api() {
    let (status, body) = get_text("/api/models").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json, serde_json::json!([{"id": "persistence", "name": "Persistence"}]));
}

#[tokio::test]
async fn test_launches_api() {
    let (status, body) = get_text("/api/launches").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[0]["id"], "crew2demo");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (status, content_type, _) = get("/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));
}
