//! REST API endpoints for clause analysis

use actix_web::{HttpResponse, post, web};

use crate::api::error::ApiError;
use crate::model::ClauseRequest;
use crate::service::ClauseAnalysisService;

/// Analyze a contract clause for legal and commercial risk
///
/// Returns the risk assessment in both English and Arabic.
#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body = ClauseRequest,
    responses(
        (status = 200, description = "Clause analyzed", body = crate::model::AnalysisResult),
        (status = 400, description = "Blank clause (sentinel error) or invalid request", body = crate::model::ErrorResult),
        (status = 413, description = "Clause exceeds the maximum length", body = crate::api::error::ErrorDetail),
        (status = 422, description = "Model judged the input not to be a clause", body = crate::model::ErrorResult),
        (status = 502, description = "Model call failed or returned invalid output", body = crate::model::ErrorResult),
        (status = 504, description = "Model call timed out", body = crate::model::ErrorResult)
    ),
    tag = "analysis"
)]
#[post("/api/analyze")]
pub async fn analyze_clause(
    service: web::Data<ClauseAnalysisService>,
    request: web::Json<ClauseRequest>,
) -> Result<HttpResponse, ApiError> {
    let result = service.analyze(&request).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Analyze multiple contract clauses in a single request
#[utoipa::path(
    post,
    path = "/api/batch-analyze",
    request_body = Vec<ClauseRequest>,
    responses(
        (status = 200, description = "Per-clause results", body = crate::model::BatchResponse),
        (status = 400, description = "Too many clauses", body = crate::api::error::ErrorDetail)
    ),
    tag = "analysis"
)]
#[post("/api/batch-analyze")]
pub async fn batch_analyze(
    service: web::Data<ClauseAnalysisService>,
    requests: web::Json<Vec<ClauseRequest>>,
) -> Result<HttpResponse, ApiError> {
    let response = service.analyze_batch(&requests).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Configure analysis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(analyze_clause).service(batch_analyze);
}
