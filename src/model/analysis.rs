use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;

/// Literal error returned for blank or non-clause input
pub const NO_VALID_CLAUSE: &str = "No valid clause provided";

/// Risk classification of a clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    /// Map the exact Arabic label used by the bilingual prompt
    pub fn from_arabic_label(label: &str) -> Option<Self> {
        match label {
            "منخفض" => Some(RiskLevel::Low),
            "متوسط" => Some(RiskLevel::Medium),
            "مرتفع" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-sensitive: anything other than `Low`, `Medium` or `High` is rejected.
impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(RiskLevel::Low),
            "Medium" => Ok(RiskLevel::Medium),
            "High" => Ok(RiskLevel::High),
            other => Err(format!("'{}' is not one of Low, Medium, High", other)),
        }
    }
}

/// Risk assessment of a clause in one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RiskAssessment {
    /// Plain-language summary of the clause
    #[schemars(description = "Plain-language summary of the clause, at most 40 words")]
    pub summary: String,

    pub risk: RiskLevel,

    /// Why the clause received its risk level
    #[schemars(description = "Why the clause got that risk label, at most 25 words")]
    pub reason: String,

    /// Safer alternative wording
    #[schemars(
        description = "Safer wording, at most 40 words; if already safe, restate the clause more clearly"
    )]
    pub rewrite: String,
}

/// Request-scoped facts about an analysis
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalysisMetadata {
    /// Model identifier used for the invocation
    pub model: String,
    /// Wall-clock time spent waiting on the model
    #[serde(serialize_with = "serialize_seconds")]
    #[schema(value_type = String, example = "1.37s")]
    pub processing_time: Duration,
    /// Character count of the submitted clause
    pub clause_length: usize,
    pub timestamp: DateTime<Utc>,
    pub has_context: bool,
    pub industry: Option<String>,
}

fn serialize_seconds<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.2}s", duration.as_secs_f64()))
}

/// Bilingual analysis of a single clause
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalysisResult {
    pub english: RiskAssessment,
    pub arabic: RiskAssessment,
    pub metadata: AnalysisMetadata,
}

/// Terminal error shape returned instead of an [`AnalysisResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResult {
    pub error: String,
}

impl ErrorResult {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    pub fn no_valid_clause() -> Self {
        Self::new(NO_VALID_CLAUSE)
    }
}

/// Outcome of one clause inside a batch request
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BatchEntry {
    Success {
        result: AnalysisResult,
    },
    Error {
        error: String,
        /// Leading excerpt of the failed clause
        clause: String,
    },
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchResponse {
    pub results: Vec<BatchEntry>,
    pub total: usize,
}
