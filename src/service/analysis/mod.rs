//! Clause risk analysis service using LLM
//!
//! A request moves through `Received -> Validating -> Completed | Rejected`.
//! Invalid clauses are rejected before any model call; everything else goes
//! through prompt construction, one (bounded-retry) model call and strict
//! validation of the reply.

use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

use crate::model::{
    AnalysisMetadata, AnalysisPolicy, AnalysisResult, BatchEntry, BatchResponse, ClauseRequest,
};
use crate::service::analysis::prompts::build_analysis_prompt;
use crate::service::analysis::validation::{
    Language, ModelOutput, parse_model_output, word_limit_warnings,
};
use crate::service::llm::ModelInvoker;

pub mod error;
pub mod prompts;
pub mod validation;

pub use error::{AnalysisError, InvalidInput};

/// Characters of a failed clause echoed back in batch results
const BATCH_EXCERPT_CHARS: usize = 50;

/// Service for assessing the risk of contract clauses
pub struct ClauseAnalysisService {
    invoker: ModelInvoker,
    policy: AnalysisPolicy,
    log_clause_content: bool,
}

impl ClauseAnalysisService {
    pub fn new(invoker: ModelInvoker, policy: AnalysisPolicy, log_clause_content: bool) -> Self {
        tracing::info!(
            model = %invoker.model(),
            max_clause_chars = policy.max_clause_chars,
            max_retries = policy.max_retries,
            timeout_secs = policy.remote_timeout_secs,
            "Clause analysis service initialized"
        );

        Self {
            invoker,
            policy,
            log_clause_content,
        }
    }

    pub fn model(&self) -> &str {
        self.invoker.model()
    }

    pub fn policy(&self) -> &AnalysisPolicy {
        &self.policy
    }

    /// Check the clause against the length policy
    pub fn validate_clause(&self, request: &ClauseRequest) -> Result<(), InvalidInput> {
        let clause = request.clause.trim();
        if clause.is_empty() {
            return Err(InvalidInput::BlankClause);
        }

        let length = clause.chars().count();
        if length < self.policy.min_clause_chars {
            return Err(InvalidInput::ClauseTooShort {
                min: self.policy.min_clause_chars,
                actual: length,
            });
        }
        if length > self.policy.max_clause_chars {
            return Err(InvalidInput::ClauseTooLong {
                max: self.policy.max_clause_chars,
                actual: length,
            });
        }
        Ok(())
    }

    /// Analyze a single clause
    pub async fn analyze(&self, request: &ClauseRequest) -> Result<AnalysisResult, AnalysisError> {
        let clause_length = request.clause.chars().count();
        let span = tracing::info_span!(
            "analyze_clause",
            request_id = %Uuid::new_v4(),
            clause_length = clause_length,
        );

        self.run_pipeline(request, clause_length)
            .instrument(span)
            .await
    }

    async fn run_pipeline(
        &self,
        request: &ClauseRequest,
        clause_length: usize,
    ) -> Result<AnalysisResult, AnalysisError> {
        if let Err(e) = self.validate_clause(request) {
            tracing::info!(reason = %e, "Clause rejected before model call");
            return Err(e.into());
        }

        if self.log_clause_content {
            tracing::debug!(clause = %request.clause, "Analyzing clause");
        }

        let prompt = build_analysis_prompt(request);
        let invocation = self.invoker.invoke(&prompt).await?;

        let (english, arabic) = match parse_model_output(&invocation.text) {
            Ok(ModelOutput::Assessments { english, arabic }) => (english, arabic),
            Ok(ModelOutput::Rejected(message)) => {
                tracing::info!(message = %message, "Model rejected the clause");
                return Err(AnalysisError::ModelRejected(message));
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    response_length = invocation.text.len(),
                    "Model output failed schema validation"
                );
                return Err(e.into());
            }
        };

        for warning in word_limit_warnings(&english, Language::English)
            .into_iter()
            .chain(word_limit_warnings(&arabic, Language::Arabic))
        {
            tracing::warn!(warning = %warning, "Assessment exceeds advisory word limit");
        }

        tracing::info!(
            risk = %english.risk,
            elapsed_ms = invocation.elapsed.as_millis(),
            "Clause analysis completed"
        );

        Ok(AnalysisResult {
            english,
            arabic,
            metadata: AnalysisMetadata {
                model: self.model().to_string(),
                processing_time: invocation.elapsed,
                clause_length,
                timestamp: Utc::now(),
                has_context: request.context_text().is_some(),
                industry: request.industry_hint().map(|i| i.name().to_string()),
            },
        })
    }

    /// Analyze several clauses one after another
    pub async fn analyze_batch(
        &self,
        requests: &[ClauseRequest],
    ) -> Result<BatchResponse, AnalysisError> {
        if requests.len() > self.policy.max_batch_size {
            return Err(InvalidInput::BatchTooLarge {
                max: self.policy.max_batch_size,
            }
            .into());
        }

        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            let entry = match self.analyze(request).await {
                Ok(result) => BatchEntry::Success { result },
                Err(e) => BatchEntry::Error {
                    error: e.to_string(),
                    clause: format!(
                        "{}...",
                        request.clause.chars().take(BATCH_EXCERPT_CHARS).collect::<String>()
                    ),
                },
            };
            results.push(entry);
        }

        let failed = results
            .iter()
            .filter(|r| matches!(r, BatchEntry::Error { .. }))
            .count();
        tracing::info!(
            total = requests.len(),
            failed = failed,
            "Batch analysis completed"
        );

        Ok(BatchResponse {
            results,
            total: requests.len(),
        })
    }
}
