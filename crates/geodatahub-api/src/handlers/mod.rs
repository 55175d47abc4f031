mod datasources;
mod health;
mod metadata;
mod recommend;
mod search;

pub use datasources::{get_datasource, list_categories, list_datasources};
pub use health::{health_check, root};
pub use metadata::{get_product, list_data_types, list_products, list_providers};
pub use recommend::recommend_datasources;
pub use search::{search, search_nl};
