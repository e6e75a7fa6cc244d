use crate::error::{ApiError, ErrorResponse};
use crate::models::CatalogEntry;
use crate::routes;
use crate::state::AppState;
use axum::{extract::Path, extract::State, http::StatusCode, Json};

/// GET /api/{category} handler - List every entry of a category
///
/// Entries come back in the store's natural order with their stored shape,
/// including the store-assigned `_id`. There is no pagination or filtering.
#[utoipa::path(
    get,
    path = routes::CATALOG,
    params(
        ("category" = String, Path, description = "One of: pizzas, bebidas, sobremesas, saladas")
    ),
    responses(
        (status = 200, description = "All entries of the category", body = Vec<CatalogEntry>),
        (status = 404, description = "Unknown category", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn list_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<(StatusCode, Json<Vec<CatalogEntry>>), ApiError> {
    let category = super::parse_category(&slug)?;

    let entries = state.catalog.list_all(category).await?;

    tracing::info!("Listed {} {} entries", entries.len(), category);
    Ok((StatusCode::OK, Json(entries)))
}
