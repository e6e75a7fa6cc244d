// Route path constants - single source of truth for all API paths

pub const ROOT: &str = "/";
pub const HEALTH: &str = "/health";
pub const CATALOG: &str = "/api/{category}";
pub const UPLOADS: &str = "/uploads";
pub const SWAGGER_UI: &str = "/swagger-ui";
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";
