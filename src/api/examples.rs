//! Example contract clauses for demos and manual testing

use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ExampleClause {
    pub title: String,
    pub clause: String,
    pub category: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExamplesResponse {
    pub examples: Vec<ExampleClause>,
}

const EXAMPLES: [(&str, &str, &str); 3] = [
    (
        "Unlimited Liability",
        "The Contractor shall be liable for any and all damages, losses, costs, and expenses arising from or related to the performance of services under this Agreement, without any limitation.",
        "liability",
    ),
    (
        "Automatic Renewal",
        "This Agreement shall automatically renew for successive one-year terms unless either party provides written notice of non-renewal at least 90 days prior to the end of the current term.",
        "term",
    ),
    (
        "Broad Confidentiality",
        "All information shared by either party, whether marked confidential or not, shall be deemed confidential and shall not be disclosed for a period of 10 years after termination.",
        "confidentiality",
    ),
];

/// Get example contract clauses for trying out the analyzer
#[utoipa::path(
    get,
    path = "/api/examples",
    responses(
        (status = 200, description = "Example clauses", body = ExamplesResponse)
    ),
    tag = "analysis"
)]
#[get("/api/examples")]
pub async fn get_examples() -> impl Responder {
    let examples = EXAMPLES
        .iter()
        .map(|(title, clause, category)| ExampleClause {
            title: title.to_string(),
            clause: clause.to_string(),
            category: category.to_string(),
        })
        .collect();

    HttpResponse::Ok().json(ExamplesResponse { examples })
}

/// Configure example routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_examples);
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test};
    use serde_json::Value;

    use super::*;

    #[actix_web::test]
    async fn test_examples_listed() {
        let app = test::init_service(App::new().configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/examples").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let examples = body["examples"].as_array().unwrap();
        assert_eq!(examples.len(), 3);
        assert_eq!(examples[0]["category"], "liability");
        assert!(
            examples
                .iter()
                .all(|e| e["clause"].as_str().unwrap().len() > 10)
        );
    }
}
