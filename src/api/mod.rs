//! HTTP surface of the service

use actix_web::http::Method;
use actix_web::middleware::DefaultHeaders;
use actix_web::{HttpResponse, web};

pub mod analyze;
pub mod error;
pub mod examples;
pub mod health;
pub mod openapi;

/// Large enough for a full batch of maximum-length clauses
const JSON_PAYLOAD_LIMIT: usize = 1024 * 1024;

/// Register every route plus the JSON extractor configuration
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_PAYLOAD_LIMIT)
            .error_handler(error::ApiError::from_json_error),
    )
    .configure(analyze::configure)
    .configure(examples::configure)
    .configure(health::configure)
    .configure(openapi::configure)
    .route("/api/{tail:.*}", web::method(Method::OPTIONS).to(preflight));
}

/// Permissive CORS headers for the browser frontend
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "GET, POST, OPTIONS"))
        .add(("Access-Control-Allow-Headers", "*"))
}

async fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}
