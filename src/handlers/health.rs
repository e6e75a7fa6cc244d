use crate::error::{HealthResponse, UnhealthyResponse};
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

pub const ROOT_MESSAGE: &str = "API ViSa Pizzaria online!";

/// GET / handler - Liveness probe
///
/// Answers with a fixed text body. The heartbeat and external uptime
/// monitors hit this route, so every call is logged as a received ping.
#[utoipa::path(
    get,
    path = routes::ROOT,
    responses(
        (status = 200, description = "Service is running", body = String, content_type = "text/plain")
    ),
    tag = "health"
)]
pub async fn root_handler() -> &'static str {
    tracing::info!("Ping received - server is active");
    ROOT_MESSAGE
}

/// GET /health handler - Health check endpoint
///
/// Pings MongoDB to verify database connectivity.
/// Returns 200 OK if the database is reachable, 503 Service Unavailable otherwise.
#[utoipa::path(
    get,
    path = routes::HEALTH,
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = UnhealthyResponse)
    ),
    tag = "health"
)]
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<HealthResponse>), (StatusCode, Json<UnhealthyResponse>)> {
    match state.catalog.store().health_check().await {
        Ok(_) => {
            tracing::debug!("Health check passed");
            Ok((
                StatusCode::OK,
                Json(HealthResponse {
                    status: "healthy".to_string(),
                }),
            ))
        }
        Err(e) => {
            tracing::error!("Health check failed: {:#}", e);
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(UnhealthyResponse {
                    status: "unhealthy".to_string(),
                    error: format!("Cannot connect to database: {:#}", e),
                }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{body_bytes, test_app};
    use crate::store::memory::MemoryStore;
    use axum::{body::Body, http::Request};
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_root_returns_fixed_text() {
        let temp = tempfile::tempdir().unwrap();
        let app = test_app(Arc::new(MemoryStore::new()), temp.path());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, ROOT_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_health_endpoint_healthy() {
        let temp = tempfile::tempdir().unwrap();
        let app = test_app(Arc::new(MemoryStore::new()), temp.path());

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let response_json: HealthResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(response_json.status, "healthy");
    }

    #[tokio::test]
    async fn test_health_endpoint_unhealthy() {
        let temp = tempfile::tempdir().unwrap();
        let app = test_app(Arc::new(MemoryStore::failing()), temp.path());

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let response_json: UnhealthyResponse =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(response_json.status, "unhealthy");
        assert!(response_json.error.contains("connection refused"));
    }
}
