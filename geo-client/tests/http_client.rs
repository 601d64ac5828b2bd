use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use geo_client::{ClientError, GeoClient, JobApi};
use geo_core::{JobId, JobState};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct MockState {
    cancels: Arc<AtomicUsize>,
}

async fn job_status(Path(id): Path<i64>) -> Result<Json<Value>, StatusCode> {
    match id {
        42 => Ok(Json(json!({
            "id": 42,
            "status": "executing_queries",
            "total_queries": 10,
            "completed_queries": 4,
            "failed_queries": 0,
            "progress_percentage": 40.0,
            "started_at": "2026-10-16T09:00:00Z",
            "completed_at": null,
            "elapsed_seconds": 31.5,
            "error_message": null
        }))),
        7 => Ok(Json(json!({
            "id": 7,
            "status": "failed",
            "progress_percentage": 0.0,
            "elapsed_seconds": null,
            "error_message": "rate limit exceeded"
        }))),
        500 => Err(StatusCode::INTERNAL_SERVER_ERROR),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn job_categories(Path(_id): Path<i64>) -> Json<Value> {
    Json(json!({
        "categories": [
            {"id": 11, "name": "Comparisons", "provider": "anthropic", "order_index": 2, "query_count": 3},
            {"id": 10, "name": "Brand", "description": "Direct brand questions", "provider": "openai", "order_index": 1, "query_count": 5}
        ]
    }))
}

async fn cancel_job(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> StatusCode {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer token-123") {
        return StatusCode::UNAUTHORIZED;
    }
    if id == 9 {
        return StatusCode::CONFLICT;
    }
    state.cancels.fetch_add(1, Ordering::SeqCst);
    StatusCode::ACCEPTED
}

async fn spawn_mock_api(state: MockState) -> String {
    let router = Router::new()
        .route("/api/v1/jobs/{id}/status", get(job_status))
        .route("/api/v1/jobs/{id}/categories", get(job_categories))
        .route("/api/v1/jobs/{id}/cancel", post(cancel_job))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}/", addr)
}

fn job(id: i64) -> JobId {
    JobId::new(id).unwrap()
}

#[tokio::test]
async fn test_get_job_status() {
    let base = spawn_mock_api(MockState::default()).await;
    let client = GeoClient::new(base);

    let status = client.get_job_status(job(42)).await.unwrap();
    assert_eq!(status.id, job(42));
    assert_eq!(status.status, JobState::ExecutingQueries);
    assert_eq!(status.completed_queries, 4);
    assert_eq!(status.progress_percentage, 40.0);
    assert_eq!(status.elapsed_seconds, Some(31.5));
}

#[tokio::test]
async fn test_failed_job_keeps_backend_message() {
    let base = spawn_mock_api(MockState::default()).await;
    let client = GeoClient::new(base);

    let status = client.get_job_status(job(7)).await.unwrap();
    assert_eq!(status.status, JobState::Failed);
    assert_eq!(status.failure_message(), "rate limit exceeded");
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let base = spawn_mock_api(MockState::default()).await;
    let client = GeoClient::new(base);

    let err = client.get_job_status(job(1234)).await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let base = spawn_mock_api(MockState::default()).await;
    let client = GeoClient::new(base);

    let err = client.get_job_status(job(500)).await.unwrap_err();
    assert!(matches!(err, ClientError::ApiError { status: 500, .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_categories_are_sorted() {
    let base = spawn_mock_api(MockState::default()).await;
    let client = GeoClient::new(base);

    let categories = client.get_job_categories(job(42)).await.unwrap();
    let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Brand", "Comparisons"]);
    assert_eq!(categories[0].provider, "openai");
}

#[tokio::test]
async fn test_cancel_sends_token() {
    let state = MockState::default();
    let base = spawn_mock_api(state.clone()).await;

    let anonymous = GeoClient::new(base.clone());
    let err = anonymous.cancel_job(job(42)).await.unwrap_err();
    assert!(matches!(err, ClientError::ApiError { status: 401, .. }));

    let client = GeoClient::new(base).with_token("token-123");
    client.cancel_job(job(42)).await.unwrap();
    assert_eq!(state.cancels.load(Ordering::SeqCst), 1);

    let err = client.cancel_job(job(9)).await.unwrap_err();
    assert!(matches!(err, ClientError::ApiError { status: 409, .. }));
    assert!(!err.is_transient());
    assert_eq!(state.cancels.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_client_through_trait_object() {
    let base = spawn_mock_api(MockState::default()).await;
    let api: Arc<dyn JobApi> = Arc::new(GeoClient::new(base));

    let status = api.get_job_status(job(42)).await.unwrap();
    assert_eq!(status.status, JobState::ExecutingQueries);
}

#[tokio::test]
async fn test_unreachable_api_is_request_failure() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = GeoClient::new(format!("http://{}", addr));
    let err = client.get_job_status(job(42)).await.unwrap_err();
    assert!(matches!(err, ClientError::RequestFailed(_)));
    assert!(err.is_transient());
}
