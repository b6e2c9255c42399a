//! Prompts for clause risk analysis

use std::sync::LazyLock;

use crate::model::{ClauseRequest, NO_VALID_CLAUSE, RiskAssessment};
use crate::service::llm::PromptPayload;

/// System prompt for clause risk analysis
pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are "ContractRiskAI", a senior UAE contract lawyer who writes in plain language.

Your role is to help a busy business user spot the legal and commercial risk of a
single contract clause quickly, in English and in Arabic.

OUTPUT FORMAT
Reply with exactly two flat JSON objects, one after the other, and nothing else:
1. the English assessment
2. the Arabic assessment (same meaning, written in Arabic)

Each object has exactly these keys:
- "summary": plain-language summary, at most 40 words
- "risk": exactly one of "Low", "Medium", "High" (use these English values in both objects)
- "reason": why the clause got that label, at most 25 words
- "rewrite": safer wording, at most 40 words; if already safe, restate the clause more clearly

RULES
- Keep it simple and minimal, no legalese beyond what is needed.
- No prose, no markdown, no chain-of-thought. JSON only.
- Do not invent facts that are not present in the clause.
- If the input is empty or not a contract clause, reply exactly: {"error":"No valid clause provided"}

RISK FRAMEWORK
Low: standard market terms, balanced obligations, clear termination rights, reasonable limitations.
Medium: some imbalanced terms, unclear obligations, limited remedies, ambiguous language.
High: unlimited liability, one-sided obligations, no termination rights, unreasonable restrictions, broad indemnification.

EXAMPLE
Clause: "The Service Provider shall indemnify and hold harmless the Client from any and all claims."
Reply:
{"summary":"Service Provider must protect Client from all legal claims and costs","risk":"High","reason":"Unlimited indemnity with no exceptions","rewrite":"Service Provider indemnifies Client for claims arising from Provider's negligence"}
{"summary":"يجب على مقدم الخدمة حماية العميل من جميع المطالبات القانونية","risk":"High","reason":"تعويض غير محدود بدون استثناءات","rewrite":"يعوض مقدم الخدمة العميل عن المطالبات الناتجة عن إهمال المقدم"}

DISCLAIMER
You are an AI assistant, not a lawyer; users must obtain licensed legal advice."#;

/// JSON schema of one assessment object, sent as a structured-output hint
static ASSESSMENT_SCHEMA: LazyLock<String> = LazyLock::new(|| {
    serde_json::to_string(&schemars::schema_for!(RiskAssessment)).unwrap_or_default()
});

const CLOSING_INSTRUCTION: &str =
    "Respond ONLY with the English JSON object followed by the Arabic JSON object.";

/// Full system message: fixed instructions plus the schema hint
pub fn system_message() -> String {
    format!(
        "{}\n\nJSON SCHEMA (each of the two objects must validate against it)\n{}\n\nInvalid input reply: {{\"error\":\"{}\"}}",
        ANALYSIS_SYSTEM_PROMPT,
        ASSESSMENT_SCHEMA.as_str(),
        NO_VALID_CLAUSE
    )
}

/// Build the prompt for a validated clause request
///
/// Segments are joined in a fixed order: clause, context, industry, closing
/// instruction. Blank optional values are left out.
pub fn build_analysis_prompt(request: &ClauseRequest) -> PromptPayload {
    let mut segments = vec![format!(
        "Analyze this contract clause:\n\n{}",
        request.clause.trim()
    )];

    if let Some(context) = request.context_text() {
        segments.push(format!("Additional context: {}", context));
    }

    if let Some(industry) = request.industry_hint() {
        segments.push(format!(
            "Industry context ({}): {}",
            industry.name().trim(),
            industry.guidance()
        ));
    }

    segments.push(CLOSING_INSTRUCTION.to_string());

    PromptPayload {
        system: system_message(),
        user: segments.join("\n\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clause_only() {
        let prompt = build_analysis_prompt(&ClauseRequest::new("  Payment due in 30 days.  "));

        assert_eq!(
            prompt.user,
            format!(
                "Analyze this contract clause:\n\nPayment due in 30 days.\n\n{}",
                CLOSING_INSTRUCTION
            )
        );
        assert!(!prompt.user.contains("Additional context"));
        assert!(!prompt.user.contains("Industry context"));
    }

    #[test]
    fn test_context_precedes_industry() {
        let request = ClauseRequest::new("Payment due in 30 days.")
            .with_industry("construction")
            .with_context("Subcontract for a villa project");
        let prompt = build_analysis_prompt(&request);

        let context_at = prompt
            .user
            .find("Additional context: Subcontract for a villa project")
            .unwrap();
        let industry_at = prompt
            .user
            .find("Industry context (construction): Focus on delay penalties")
            .unwrap();
        assert!(context_at < industry_at);
        assert!(prompt.user.ends_with(CLOSING_INSTRUCTION));
    }

    #[test]
    fn test_unknown_industry_uses_general_guidance() {
        let request = ClauseRequest::new("Payment due in 30 days.").with_industry("Aerospace");
        let prompt = build_analysis_prompt(&request);

        assert!(prompt.user.contains(
            "Industry context (Aerospace): Apply general commercial contract principles"
        ));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let request = ClauseRequest::new("Payment due in 30 days.").with_context("NDA");
        assert_eq!(build_analysis_prompt(&request), build_analysis_prompt(&request));
    }

    #[test]
    fn test_system_message_states_contract() {
        let system = system_message();

        assert!(system.contains(r#"{"error":"No valid clause provided"}"#));
        for key in ["\"summary\"", "\"risk\"", "\"reason\"", "\"rewrite\""] {
            assert!(system.contains(key), "missing {key}");
        }
        assert!(system.contains("at most 40 words"));
        assert!(system.contains("at most 25 words"));
        // schema hint carries the risk enum
        assert!(system.contains("\"Medium\""));
        assert!(system.contains("JSON SCHEMA"));
    }
}
