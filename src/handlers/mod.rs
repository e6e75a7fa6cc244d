pub mod health;
pub mod create;
pub mod list;

pub use health::{health_handler, root_handler};
pub use create::create_handler;
pub use list::list_handler;

use crate::category::Category;
use crate::error::ApiError;

fn parse_category(slug: &str) -> Result<Category, ApiError> {
    slug.parse()
        .map_err(ApiError::UnknownCategory)
}
