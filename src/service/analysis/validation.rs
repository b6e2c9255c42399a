//! Validation of raw model output
//!
//! The model is told the output contract in the prompt, but its reply is never
//! trusted: every response goes through [`parse_model_output`] before it can
//! become an analysis result.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::model::{RiskAssessment, RiskLevel};

/// Advisory word ceilings; exceeding them is logged, never rejected
const SUMMARY_WORD_LIMIT: usize = 40;
const REASON_WORD_LIMIT: usize = 25;
const REWRITE_WORD_LIMIT: usize = 40;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[a-zA-Z]*\s*(.*?)\s*```$").expect("code fence pattern is valid")
});

/// Language of an assessment object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Arabic,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::English => f.write_str("english"),
            Language::Arabic => f.write_str("arabic"),
        }
    }
}

/// Reasons raw model output does not match the expected schema
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaViolation {
    #[error("response is empty")]
    Empty,

    #[error("response is not JSON: {0}")]
    NotJson(String),

    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    #[error("{language} assessment is malformed: {detail}")]
    InvalidFields { language: Language, detail: String },

    #[error("{language} assessment has invalid risk '{value}'")]
    InvalidRisk { language: Language, value: String },

    #[error("unexpected data after the arabic assessment")]
    TrailingData,
}

/// Well-formed model output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOutput {
    /// Both assessments were present and valid
    Assessments {
        english: RiskAssessment,
        arabic: RiskAssessment,
    },
    /// The model declined with an error object
    Rejected(String),
}

/// One assessment object exactly as the model must emit it
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAssessment {
    summary: String,
    risk: String,
    reason: String,
    rewrite: String,
}

/// Single-object layout with the Arabic assessment nested under `arabic`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNestedAnalysis {
    summary: String,
    risk: String,
    reason: String,
    rewrite: String,
    /// Checked separately so defects are reported against the Arabic assessment
    arabic: Value,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawError {
    error: String,
}

/// Parse raw model text into assessments or a model-side rejection
///
/// Accepted layouts:
/// 1. a single `{"error": "..."}` object
/// 2. two consecutive assessment objects, English then Arabic
/// 3. one English assessment object with the Arabic one nested under `arabic`
pub fn parse_model_output(raw: &str) -> Result<ModelOutput, SchemaViolation> {
    let text = strip_code_fence(raw.trim());
    if text.is_empty() {
        return Err(SchemaViolation::Empty);
    }

    let mut stream = serde_json::Deserializer::from_str(text).into_iter::<Value>();

    let first = match stream.next() {
        Some(Ok(value)) => value,
        Some(Err(e)) => return Err(SchemaViolation::NotJson(e.to_string())),
        None => return Err(SchemaViolation::Empty),
    };

    let second = match stream.next() {
        Some(Ok(value)) => Some(value),
        Some(Err(e)) => return Err(SchemaViolation::NotJson(e.to_string())),
        None => None,
    };

    if second.is_some() && stream.next().is_some() {
        return Err(SchemaViolation::TrailingData);
    }

    match second {
        Some(arabic) => {
            if is_error_object(&first) {
                return Err(SchemaViolation::UnexpectedShape(
                    "error object followed by further output".to_string(),
                ));
            }
            let english = to_assessment(first, Language::English, strict_risk)?;
            let arabic = to_assessment(arabic, Language::Arabic, strict_risk)?;
            Ok(ModelOutput::Assessments { english, arabic })
        }
        None => parse_single_object(first),
    }
}

fn parse_single_object(value: Value) -> Result<ModelOutput, SchemaViolation> {
    let Value::Object(map) = &value else {
        return Err(SchemaViolation::UnexpectedShape(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )));
    };

    if map.contains_key("error") {
        let raw: RawError = serde_json::from_value(value)
            .map_err(|e| SchemaViolation::UnexpectedShape(format!("error object: {}", e)))?;
        return Ok(ModelOutput::Rejected(raw.error));
    }

    if !map.contains_key("arabic") {
        return Err(SchemaViolation::UnexpectedShape(
            "arabic assessment is missing".to_string(),
        ));
    }

    let nested: RawNestedAnalysis =
        serde_json::from_value(value).map_err(|e| SchemaViolation::InvalidFields {
            language: Language::English,
            detail: e.to_string(),
        })?;

    let english = RawAssessment {
        summary: nested.summary,
        risk: nested.risk,
        reason: nested.reason,
        rewrite: nested.rewrite,
    };

    Ok(ModelOutput::Assessments {
        english: finish_assessment(english, Language::English, strict_risk)?,
        arabic: to_assessment(nested.arabic, Language::Arabic, nested_arabic_risk)?,
    })
}

fn to_assessment(
    value: Value,
    language: Language,
    risk_parser: fn(&str) -> Option<RiskLevel>,
) -> Result<RiskAssessment, SchemaViolation> {
    let raw: RawAssessment =
        serde_json::from_value(value).map_err(|e| SchemaViolation::InvalidFields {
            language,
            detail: e.to_string(),
        })?;
    finish_assessment(raw, language, risk_parser)
}

fn finish_assessment(
    raw: RawAssessment,
    language: Language,
    risk_parser: fn(&str) -> Option<RiskLevel>,
) -> Result<RiskAssessment, SchemaViolation> {
    let risk = risk_parser(&raw.risk).ok_or_else(|| SchemaViolation::InvalidRisk {
        language,
        value: raw.risk.clone(),
    })?;

    Ok(RiskAssessment {
        summary: raw.summary,
        risk,
        reason: raw.reason,
        rewrite: raw.rewrite,
    })
}

fn strict_risk(value: &str) -> Option<RiskLevel> {
    value.parse().ok()
}

/// The nested layout asks for Arabic risk labels; the exact labels map one-to-one.
fn nested_arabic_risk(value: &str) -> Option<RiskLevel> {
    strict_risk(value).or_else(|| RiskLevel::from_arabic_label(value))
}

fn is_error_object(value: &Value) -> bool {
    value.as_object().is_some_and(|m| m.contains_key("error"))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn strip_code_fence(text: &str) -> &str {
    CODE_FENCE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
}

/// Report fields that exceed their advisory word ceilings
pub fn word_limit_warnings(assessment: &RiskAssessment, language: Language) -> Vec<String> {
    [
        ("summary", &assessment.summary, SUMMARY_WORD_LIMIT),
        ("reason", &assessment.reason, REASON_WORD_LIMIT),
        ("rewrite", &assessment.rewrite, REWRITE_WORD_LIMIT),
    ]
    .into_iter()
    .filter_map(|(field, text, limit)| {
        let words = text.split_whitespace().count();
        (words > limit).then(|| {
            format!(
                "{} {} has {} words (limit {})",
                language, field, words, limit
            )
        })
    })
    .collect()
}
