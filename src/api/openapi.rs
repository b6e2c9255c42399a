//! OpenAPI specification endpoints

use actix_web::{HttpResponse, Responder, get};
use utoipa::OpenApi;

use crate::api::error::ErrorDetail;
use crate::api::examples::{ExampleClause, ExamplesResponse};
use crate::api::health::{HealthStatus, ReadinessStatus, ServiceStatus};
use crate::model::{
    AnalysisMetadata, AnalysisResult, BatchEntry, BatchResponse, ClauseRequest, ErrorResult,
    RiskAssessment, RiskLevel,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ContractRiskAI",
        description = "Contract clause risk analysis in English and Arabic"
    ),
    paths(
        crate::api::analyze::analyze_clause,
        crate::api::analyze::batch_analyze,
        crate::api::examples::get_examples,
        crate::api::health::root,
        crate::api::health::liveness,
        crate::api::health::readiness,
    ),
    components(schemas(
        ClauseRequest,
        AnalysisResult,
        AnalysisMetadata,
        RiskAssessment,
        RiskLevel,
        ErrorResult,
        ErrorDetail,
        BatchEntry,
        BatchResponse,
        ExampleClause,
        ExamplesResponse,
        ServiceStatus,
        HealthStatus,
        ReadinessStatus,
    )),
    tags(
        (name = "analysis", description = "Clause risk analysis"),
        (name = "health", description = "Service status and probes")
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serve OpenAPI YAML specification
#[get("/openapi.yaml")]
pub async fn openapi_yaml() -> impl Responder {
    match ApiDoc::openapi().to_yaml() {
        Ok(yaml) => HttpResponse::Ok().content_type("text/yaml").body(yaml),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render OpenAPI YAML");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}
