//! Application state and service initialization
//!
//! This module centralizes service initialization and dependency injection,
//! making it easier to manage the application lifecycle and test services.

use std::sync::Arc;

use crate::model::Config;
use crate::service::{ClauseAnalysisService, LlmClient, ModelBackend, ModelInvoker};

/// Application state containing all services and shared resources
pub struct AppState {
    /// Clause risk analysis service
    pub analysis_service: Arc<ClauseAnalysisService>,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// Fails when the LLM client cannot be created from the configured key.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let llm_client = LlmClient::new(&config.openai_api_key, config.model.clone())
            .map_err(AppError::ClientInit)?;

        if config.observability.enabled {
            tracing::info!(
                host = %config.observability.host,
                log_clause_content = config.observability.log_clause_content,
                "Observability settings enabled"
            );
        }

        Ok(Self::with_backend(config, Arc::new(llm_client)))
    }

    /// Build application state around an arbitrary model backend
    pub fn with_backend(config: &Config, backend: Arc<dyn ModelBackend>) -> Self {
        let policy = config.analysis.clone();
        let invoker = ModelInvoker::new(
            backend,
            policy.remote_timeout(),
            policy.max_retries,
            policy.temperature,
        );

        Self {
            analysis_service: Arc::new(ClauseAnalysisService::new(
                invoker,
                policy,
                config.observability.log_clause_content,
            )),
        }
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// LLM client could not be created
    #[error("LLM client initialization failed: {0}")]
    ClientInit(String),
}
