pub mod analysis;
pub mod llm;

pub use analysis::ClauseAnalysisService;
pub use llm::{LlmClient, ModelBackend, ModelInvoker};
