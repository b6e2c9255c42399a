use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A contract clause submitted for analysis
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ClauseRequest {
    /// The contract clause to analyze
    pub clause: String,
    /// Additional context about the contract
    #[serde(default)]
    pub context: Option<String>,
    /// Industry context for specialized analysis
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "technology")]
    pub industry: Option<Industry>,
}

impl ClauseRequest {
    /// Context with surrounding whitespace removed, `None` when blank
    pub fn context_text(&self) -> Option<&str> {
        self.context
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Industry hint, `None` when blank
    pub fn industry_hint(&self) -> Option<&Industry> {
        self.industry.as_ref().filter(|i| !i.name().trim().is_empty())
    }
}

#[cfg(test)]
impl ClauseRequest {
    pub fn new(clause: impl Into<String>) -> Self {
        Self {
            clause: clause.into(),
            context: None,
            industry: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(Industry::from(industry.into()));
        self
    }
}

/// Industry sector used to specialise the analysis
///
/// Known sectors are matched case-insensitively. Any other value is kept
/// verbatim and receives general commercial guidance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Industry {
    Technology,
    Construction,
    Healthcare,
    Retail,
    Finance,
    RealEstate,
    Other(String),
}

impl Industry {
    /// Name as shown to the model and echoed in metadata
    pub fn name(&self) -> &str {
        match self {
            Industry::Technology => "technology",
            Industry::Construction => "construction",
            Industry::Healthcare => "healthcare",
            Industry::Retail => "retail",
            Industry::Finance => "finance",
            Industry::RealEstate => "real_estate",
            Industry::Other(name) => name,
        }
    }

    /// Risk considerations specific to the sector
    pub fn guidance(&self) -> &'static str {
        match self {
            Industry::Technology => {
                "Consider IP ownership, data protection, SLA terms, and software licensing risks."
            }
            Industry::Construction => {
                "Focus on delay penalties, variation procedures, defects liability, and payment terms."
            }
            Industry::Healthcare => {
                "Emphasize patient data privacy, malpractice liability, and regulatory compliance."
            }
            Industry::Retail => {
                "Review inventory risk, return policies, supplier terms, and consumer protection."
            }
            Industry::Finance => {
                "Analyze regulatory compliance, fiduciary duties, and financial exposure limits."
            }
            Industry::RealEstate => {
                "Check title issues, maintenance obligations, rent escalation, and termination rights."
            }
            Industry::Other(_) => {
                "Apply general commercial contract principles and industry best practices."
            }
        }
    }
}

impl From<String> for Industry {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "technology" => Industry::Technology,
            "construction" => Industry::Construction,
            "healthcare" => Industry::Healthcare,
            "retail" => Industry::Retail,
            "finance" => Industry::Finance,
            "real_estate" => Industry::RealEstate,
            _ => Industry::Other(value),
        }
    }
}

impl From<Industry> for String {
    fn from(value: Industry) -> Self {
        value.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_industry_case_insensitive() {
        let request: ClauseRequest =
            serde_json::from_str(r#"{"clause": "x", "industry": "Real_Estate"}"#).unwrap();
        assert_eq!(request.industry, Some(Industry::RealEstate));
    }

    #[test]
    fn test_unknown_industry_kept_verbatim() {
        let industry = Industry::from("Aerospace".to_string());
        assert_eq!(industry, Industry::Other("Aerospace".to_string()));
        assert_eq!(industry.name(), "Aerospace");
        assert!(industry.guidance().contains("general commercial"));
    }

    #[test]
    fn test_optional_fields_default_to_none() {
        let request: ClauseRequest = serde_json::from_str(r#"{"clause": "x"}"#).unwrap();
        assert!(request.context.is_none());
        assert!(request.industry.is_none());
    }

    #[test]
    fn test_blank_hints_are_ignored() {
        let request = ClauseRequest::new("clause")
            .with_context("   ")
            .with_industry("");
        assert!(request.context_text().is_none());
        assert!(request.industry_hint().is_none());
    }
}
