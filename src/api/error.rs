//! Unified API error handling
//!
//! Caller-side validation failures answer with `{"detail": ...}`; the blank
//! clause sentinel and every model-side failure answer with `{"error": ...}`.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::model::{ErrorResult, NO_VALID_CLAUSE};
use crate::service::analysis::{AnalysisError, InvalidInput};
use crate::service::llm::ModelError;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Validation failure response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    pub detail: String,
}

/// Unified API error type
///
/// All API endpoints should return `Result<T, ApiError>` for consistent error handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Blank clause (400, sentinel body)
    #[error("{}", NO_VALID_CLAUSE)]
    InvalidClause,

    /// Bad request / validation error (400)
    #[error("{0}")]
    BadRequest(String),

    /// Clause or body over the size limit (413)
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Model declined to analyze the input (422)
    #[error("{0}")]
    ModelRejected(String),

    /// Model call failed or produced unusable output (502)
    #[error("{0}")]
    ExternalService(String),

    /// Model call exceeded its timeout (504)
    #[error("{0}")]
    GatewayTimeout(String),
}

impl ApiError {
    fn error_type(&self) -> &'static str {
        match self {
            ApiError::InvalidClause => "invalid_clause",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
            ApiError::ModelRejected(_) => "model_rejected",
            ApiError::ExternalService(_) => "external_service_error",
            ApiError::GatewayTimeout(_) => "gateway_timeout",
        }
    }

    /// Convert JSON extractor failures into validation errors
    pub fn from_json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
        let api_error = match err {
            JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                ApiError::PayloadTooLarge(err.to_string())
            }
            _ => ApiError::BadRequest(err.to_string()),
        };
        api_error.into()
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidClause | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::ModelRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let request_id = Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                error_type = self.error_type(),
                status = status.as_u16(),
                request_id = %request_id,
                message = %self,
                "API error"
            );
        } else {
            tracing::info!(
                error_type = self.error_type(),
                status = status.as_u16(),
                request_id = %request_id,
                message = %self,
                "Request rejected"
            );
        }

        let mut response = HttpResponse::build(status);
        response.insert_header((REQUEST_ID_HEADER, request_id));

        match self {
            ApiError::BadRequest(message) | ApiError::PayloadTooLarge(message) => {
                response.json(ErrorDetail {
                    detail: message.clone(),
                })
            }
            ApiError::InvalidClause => response.json(ErrorResult::no_valid_clause()),
            ApiError::ModelRejected(message)
            | ApiError::ExternalService(message)
            | ApiError::GatewayTimeout(message) => response.json(ErrorResult::new(message.clone())),
        }
    }
}

// ============================================================================
// From conversions for service errors
// ============================================================================

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InvalidInput(InvalidInput::BlankClause) => ApiError::InvalidClause,
            AnalysisError::InvalidInput(e @ InvalidInput::ClauseTooLong { .. }) => {
                ApiError::PayloadTooLarge(e.to_string())
            }
            AnalysisError::InvalidInput(e) => ApiError::BadRequest(e.to_string()),
            AnalysisError::RemoteCall(ModelError::Timeout(_)) => {
                ApiError::GatewayTimeout(err.to_string())
            }
            AnalysisError::RemoteCall(_) | AnalysisError::SchemaViolation(_) => {
                ApiError::ExternalService(err.to_string())
            }
            AnalysisError::ModelRejected(message) => ApiError::ModelRejected(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::service::analysis::validation::SchemaViolation;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                AnalysisError::InvalidInput(InvalidInput::BlankClause),
                StatusCode::BAD_REQUEST,
            ),
            (
                AnalysisError::InvalidInput(InvalidInput::ClauseTooShort { min: 10, actual: 3 }),
                StatusCode::BAD_REQUEST,
            ),
            (
                AnalysisError::InvalidInput(InvalidInput::ClauseTooLong {
                    max: 10,
                    actual: 11,
                }),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                AnalysisError::RemoteCall(ModelError::Timeout(Duration::from_secs(15))),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                AnalysisError::RemoteCall(ModelError::RateLimited),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AnalysisError::SchemaViolation(SchemaViolation::Empty),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AnalysisError::ModelRejected(NO_VALID_CLAUSE.to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];

        for (err, expected) in cases {
            let api_error = ApiError::from(err);
            assert_eq!(api_error.status_code(), expected, "{:?}", api_error);
        }
    }

    #[test]
    fn test_remote_error_message_keeps_cause() {
        let api_error = ApiError::from(AnalysisError::RemoteCall(ModelError::Transport(
            "connection reset".to_string(),
        )));
        assert_eq!(
            api_error.to_string(),
            "Analysis failed: model request failed: connection reset"
        );
    }

    #[test]
    fn test_response_carries_request_id() {
        let response = ApiError::InvalidClause.error_response();
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }
}
