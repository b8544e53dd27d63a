//! Error types for the HTTP layer.

use std::time::Duration;

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::model::MapperError;
use crate::store::StoreError;

/// Everything a request can fail with, each mapped to a distinct status and code.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The addressed record or partial does not exist.
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// The body could not be parsed into the resource shape.
    #[error("malformed request body: {0}")]
    BadRequest(String),

    #[error("method {method} not allowed for {path}")]
    MethodNotAllowed {
        method: Method,
        path: String,
        allow: Vec<Method>,
    },

    #[error("no route for {0}")]
    NoRoute(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("could not map resource: {0}")]
    Mapping(#[from] MapperError),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    /// Stable machine-readable code carried in the error body.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::MethodNotAllowed { .. } => "method_not_allowed",
            ApiError::NoRoute(_) => "no_route",
            ApiError::Store(_) => "store_unavailable",
            ApiError::Mapping(_) => "mapping_failed",
            ApiError::Timeout(_) => "timeout",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } | ApiError::NoRoute(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Mapping(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        }));
        let mut resp = (status, body).into_response();
        if let ApiError::MethodNotAllowed { allow, .. } = &self {
            let allow = allow.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
            if let Ok(value) = HeaderValue::from_str(&allow) {
                resp.headers_mut().insert(header::ALLOW, value);
            }
        }
        resp
    }
}
