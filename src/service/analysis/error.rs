//! Error types for clause analysis

use thiserror::Error;

use crate::model::NO_VALID_CLAUSE;
use crate::service::analysis::validation::SchemaViolation;
use crate::service::llm::ModelError;

/// Caller-side problems detected before any model call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("{}", NO_VALID_CLAUSE)]
    BlankClause,

    #[error("Please provide a valid contract clause (at least {min} characters)")]
    ClauseTooShort { min: usize, actual: usize },

    #[error("Clause exceeds the maximum length of {max} characters ({actual} provided)")]
    ClauseTooLong { max: usize, actual: usize },

    #[error("Maximum {max} clauses per batch request")]
    BatchTooLarge { max: usize },
}

/// Error type for clause analysis
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    #[error("Analysis failed: {0}")]
    RemoteCall(#[from] ModelError),

    #[error("Analysis failed: invalid model output: {0}")]
    SchemaViolation(#[from] SchemaViolation),

    /// The model answered with an error object instead of an assessment
    #[error("{0}")]
    ModelRejected(String),
}
