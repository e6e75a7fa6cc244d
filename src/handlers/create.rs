use crate::catalog::CreatePayload;
use crate::error::{ApiError, ErrorResponse};
use crate::models::CreatedResponse;
use crate::payload::CreateForm;
use crate::routes;
use crate::state::AppState;
use axum::{extract::Path, extract::State, http::StatusCode, Json};

/// POST /api/{category} handler - Create a catalog entry
///
/// The body is read as multipart (with an optional `imagem` file), JSON or
/// an urlencoded form. The response carries the acknowledgment message and
/// the new entry's id; list the category to read the stored entry back.
#[utoipa::path(
    post,
    path = routes::CATALOG,
    params(
        ("category" = String, Path, description = "One of: pizzas, bebidas, sobremesas, saladas")
    ),
    request_body(
        content = CreateForm,
        content_type = "multipart/form-data",
        description = "Also accepted as application/json or application/x-www-form-urlencoded"
    ),
    responses(
        (status = 201, description = "Entry created", body = CreatedResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 404, description = "Unknown category", body = ErrorResponse),
        (status = 413, description = "Request body exceeds the configured limit", body = ErrorResponse),
        (status = 500, description = "Database or file write error", body = ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn create_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    payload: CreatePayload,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let category = super::parse_category(&slug)?;

    let created = state.catalog.create(category, payload).await?;

    tracing::info!("Created {} entry with id: {}", category, created.id);
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: created.message.to_string(),
            id: created.id,
        }),
    ))
}
