use crate::catalog::CatalogService;
use crate::config::Config;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub config: Arc<Config>,
}
