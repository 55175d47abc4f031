pub mod request;
mod response;

pub use request::{DatasourceParams, NlSearchParams, ProviderParams, RecommendRequest, SearchRequest};
pub use response::{
    CategoriesResponse, CategorySummary, DataTypesResponse, DatasourcesResponse, HealthResponse,
    ParsedRequest, ProductsResponse, ProviderSummary, ProvidersResponse, RecommendResponse,
    RootResponse, SearchResponse,
};
