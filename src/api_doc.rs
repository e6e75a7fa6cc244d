use utoipa::OpenApi;

use crate::error::{ErrorResponse, HealthResponse, UnhealthyResponse};
use crate::handlers;
use crate::models::{CatalogEntry, CreatedResponse, Price, SizedPrice};
use crate::payload::CreateForm;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "pizzeria-catalog API",
        version = "1.0.0",
        description = "Menu catalog for a pizzeria: pizzas, drinks, desserts and salads backed by MongoDB"
    ),
    paths(
        handlers::health::root_handler,
        handlers::health::health_handler,
        handlers::create::create_handler,
        handlers::list::list_handler
    ),
    components(
        schemas(
            CatalogEntry,
            Price,
            SizedPrice,
            CreateForm,
            CreatedResponse,
            ErrorResponse,
            HealthResponse,
            UnhealthyResponse
        )
    ),
    tags(
        (name = "health", description = "Liveness and health check operations"),
        (name = "catalog", description = "Menu catalog operations")
    )
)]
pub struct ApiDoc;
