use actix_web::{http::StatusCode, web::Bytes, HttpRequest, HttpResponse, ResponseError};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::store::RepositoryError;
use crate::validation::ValidationError;

// ============================================================================
// HTTP adapters
// ============================================================================
//
// - gateway:  POST /orders (publishes, does not persist)
// - internal: POST/GET /internal/orders (persists synchronously)
//
// Handlers take the raw body as Bytes and parse it themselves so malformed
// JSON and missing content types get the same 400 shape as schema errors.
//
// ============================================================================

pub mod gateway;
pub mod internal;

pub const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Order {0} not found")]
    NotFound(String),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Pipeline(err.into())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::Pipeline(err.into())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Pipeline(err) => match err {
                PipelineError::Validation(_) | PipelineError::Domain(_) | PipelineError::Decode(_) => {
                    StatusCode::BAD_REQUEST
                }
                PipelineError::Conflict(_) => StatusCode::CONFLICT,
                PipelineError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::NotFound(_) => json!({ "message": self.to_string() }),
            ApiError::Pipeline(err) => match err {
                PipelineError::Validation(_) | PipelineError::Domain(_) | PipelineError::Decode(_) => {
                    json!({ "message": "Validation failed", "issues": err.issues() })
                }
                PipelineError::Conflict(details) => json!({ "message": details }),
                PipelineError::Unavailable(details) => {
                    json!({ "message": "Service unavailable", "details": details })
                }
            },
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Caller-supplied correlation id, or a fresh one.
pub fn correlation_id(req: &HttpRequest) -> String {
    req.headers()
        .get(CORRELATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

pub fn parse_json_body(body: &Bytes) -> Result<Value, PipelineError> {
    Ok(serde_json::from_slice(body)?)
}
