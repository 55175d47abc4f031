use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use geodatahub_core::error::GeodatahubError;
use serde::Serialize;

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<GeodatahubError> for ApiError {
    fn from(err: GeodatahubError) -> Self {
        let details = err.to_string();
        match &err {
            GeodatahubError::ParseError { .. } => Self::bad_request("Could not understand the query"),
            GeodatahubError::InvalidRequest { .. } => Self::bad_request("Invalid request"),
            GeodatahubError::ProductNotFound { id } => Self::not_found(format!("Product {} not found", id)),
            GeodatahubError::Provider { .. } => Self::bad_gateway("Provider request failed"),
            _ => Self::internal("Internal error"),
        }
        .with_details(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geodatahub_core::error::ProviderOperation;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (GeodatahubError::ParseError { reason: "x".into() }, StatusCode::BAD_REQUEST),
            (GeodatahubError::invalid("limit", "must be positive"), StatusCode::BAD_REQUEST),
            (GeodatahubError::ProductNotFound { id: "X".into() }, StatusCode::NOT_FOUND),
            (
                GeodatahubError::provider(ProviderOperation::Search, "earth_search", "HTTP 503"),
                StatusCode::BAD_GATEWAY,
            ),
            (GeodatahubError::Serialization("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status, status);
            assert!(api.details.is_some());
        }
    }
}
