use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::handlers::{create_handler, health_handler, list_handler, root_handler};
use crate::routes;
use crate::state::AppState;

/// Build the HTTP surface: catalog routes, uploaded files, probes and API docs
pub fn build_router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.catalog.images().upload_dir());
    let body_limit = state.config.body_limit;

    Router::new()
        .route(routes::ROOT, get(root_handler))
        .route(routes::HEALTH, get(health_handler))
        .route(routes::CATALOG, get(list_handler).post(create_handler))
        .nest_service(routes::UPLOADS, uploads)
        .merge(SwaggerUi::new(routes::SWAGGER_UI).url(routes::OPENAPI_JSON, ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::catalog::CatalogService;
    use crate::config::{Config, DEFAULT_HEARTBEAT_URL};
    use crate::heartbeat::HeartbeatTarget;
    use crate::image::ImageResolver;
    use crate::store::ItemStore;
    use axum::body::Body;
    use axum::http::Response;
    use std::path::Path;
    use std::sync::Arc;

    pub(crate) fn test_config(upload_dir: &Path, body_limit: usize) -> Config {
        Config {
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_database: Some("pizzaria-test".to_string()),
            service_port: 3001,
            service_host: "0.0.0.0".to_string(),
            upload_dir: upload_dir.to_path_buf(),
            body_limit,
            heartbeat_target: HeartbeatTarget::parse(DEFAULT_HEARTBEAT_URL).unwrap(),
            heartbeat_enabled: false,
        }
    }

    pub(crate) fn test_app_with_limit(
        store: Arc<dyn ItemStore>,
        upload_dir: &Path,
        body_limit: usize,
    ) -> Router {
        let config = test_config(upload_dir, body_limit);
        let catalog = CatalogService::new(store, ImageResolver::new(upload_dir, routes::UPLOADS));

        build_router(AppState {
            catalog,
            config: Arc::new(config),
        })
    }

    pub(crate) fn test_app(store: Arc<dyn ItemStore>, upload_dir: &Path) -> Router {
        test_app_with_limit(store, upload_dir, 10 * 1024 * 1024)
    }

    pub(crate) async fn body_bytes(response: Response<Body>) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }
}
