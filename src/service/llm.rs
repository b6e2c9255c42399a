//! Shared LLM client and interaction utilities
//!
//! The remote model sits behind [`ModelBackend`] so the analysis pipeline can
//! run against deterministic stubs. [`ModelInvoker`] adds the per-call timeout
//! and the bounded retry on top of any backend.

use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use regex::Regex;
use rig::client::CompletionClient;
use rig::completion::{CompletionError, Prompt, PromptError};
use rig::providers::openai;

/// HTTP 429 reported as a status, not a bare number anywhere in the message
static STATUS_429: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bstatus(?:\s+code)?\s*[:=]?\s*429\b|\b429 too many requests\b")
        .expect("status pattern is valid")
});

/// Markers the provider puts in a rate-limit error body
static RATE_LIMIT_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)rate_limit_exceeded|rate limit reached|too many requests")
        .expect("rate limit pattern is valid")
});

/// System + user message pair sent to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPayload {
    pub system: String,
    pub user: String,
}

/// Failure of the remote model call
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Transport(String),

    #[error("model provider rate limited the request")]
    RateLimited,

    #[error("model call timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("model returned an empty response")]
    EmptyResponse,
}

/// A remote language model reachable with a single prompt call
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Model identifier reported in analysis metadata
    fn model(&self) -> &str;

    /// Send the prompt and return the raw response text
    async fn complete(&self, prompt: &PromptPayload, temperature: f64)
    -> Result<String, ModelError>;
}

/// Shared LLM client wrapper
///
/// NOTE: Do NOT derive `Debug` on this struct, the underlying client holds the API key.
#[derive(Clone)]
pub struct LlmClient {
    client: openai::Client,
    model: String,
}

impl LlmClient {
    /// Create a new LLM client with the provided API key
    pub fn new(api_key: &str, model: impl Into<String>) -> Result<Self, String> {
        let client = openai::Client::new(api_key)
            .map_err(|e| format!("Failed to create OpenAI client: {}", e))?;

        Ok(Self {
            client,
            model: model.into(),
        })
    }
}

#[async_trait]
impl ModelBackend for LlmClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        prompt: &PromptPayload,
        temperature: f64,
    ) -> Result<String, ModelError> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(&prompt.system)
            .temperature(temperature)
            .build();

        agent
            .prompt(prompt.user.clone())
            .await
            .map_err(|e| classify_prompt_error(&e))
    }
}

fn classify_prompt_error(error: &PromptError) -> ModelError {
    let message = error.to_string();
    let rate_limited = match error {
        // Non-success responses carry the provider's error body
        PromptError::CompletionError(CompletionError::ProviderError(body)) => {
            RATE_LIMIT_BODY.is_match(body) || STATUS_429.is_match(body)
        }
        _ => STATUS_429.is_match(&message),
    };

    if rate_limited {
        ModelError::RateLimited
    } else {
        ModelError::Transport(message)
    }
}

/// Raw model output with the time spent obtaining it
#[derive(Debug, Clone)]
pub struct Invocation {
    pub text: String,
    pub elapsed: Duration,
}

/// Issues a prompt with a per-attempt timeout and a bounded retry
#[derive(Clone)]
pub struct ModelInvoker {
    backend: Arc<dyn ModelBackend>,
    timeout: Duration,
    max_retries: u32,
    temperature: f64,
}

impl ModelInvoker {
    pub fn new(
        backend: Arc<dyn ModelBackend>,
        timeout: Duration,
        max_retries: u32,
        temperature: f64,
    ) -> Self {
        Self {
            backend,
            timeout,
            max_retries,
            temperature,
        }
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Call the model, retrying the same prompt at most `max_retries` times
    ///
    /// Dropping the returned future abandons the in-flight request.
    pub async fn invoke(&self, prompt: &PromptPayload) -> Result<Invocation, ModelError> {
        let start_time = Instant::now();
        let attempts = self.max_retries + 1;
        let mut last_error = ModelError::Transport("no attempt made".to_string());

        for attempt in 1..=attempts {
            tracing::debug!(
                model = %self.model(),
                attempt = attempt,
                prompt_length = prompt.user.len(),
                "Initiating model call for clause analysis"
            );

            match self.call_once(prompt).await {
                Ok(text) => {
                    let elapsed = start_time.elapsed();
                    tracing::info!(
                        model = %self.model(),
                        attempt = attempt,
                        elapsed_ms = elapsed.as_millis(),
                        response_length = text.len(),
                        "Model call for clause analysis completed successfully"
                    );
                    return Ok(Invocation { text, elapsed });
                }
                Err(e) => {
                    tracing::warn!(
                        model = %self.model(),
                        attempt = attempt,
                        max_attempts = attempts,
                        elapsed_ms = start_time.elapsed().as_millis(),
                        error = %e,
                        "Model call for clause analysis failed"
                    );
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn call_once(&self, prompt: &PromptPayload) -> Result<String, ModelError> {
        let text = tokio::time::timeout(self.timeout, self.backend.complete(prompt, self.temperature))
            .await
            .map_err(|_| ModelError::Timeout(self.timeout))??;

        if text.trim().is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        Ok(text)
    }
}

#[cfg(test)]
pub mod testing {
    //! Deterministic model backends for tests

    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// What the stub does for a given prompt
    #[derive(Debug, Clone)]
    pub enum StubReply {
        Text(String),
        Fail(ModelError),
        /// Never answer, so the caller's timeout fires
        Hang,
    }

    type Responder = Box<dyn Fn(&PromptPayload) -> StubReply + Send + Sync>;

    /// Backend that answers from a closure and counts calls
    pub struct StubBackend {
        responder: Responder,
        calls: AtomicUsize,
    }

    impl StubBackend {
        pub fn new<F>(responder: F) -> Self
        where
            F: Fn(&PromptPayload) -> StubReply + Send + Sync + 'static,
        {
            Self {
                responder: Box::new(responder),
                calls: AtomicUsize::new(0),
            }
        }

        /// Always answer with the same text
        pub fn fixed(text: impl Into<String>) -> Self {
            let text = text.into();
            Self::new(move |_| StubReply::Text(text.clone()))
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    /// Well-formed two-object reply with the given risk label and rewrite
    pub fn bilingual_response(risk: &str, rewrite: &str) -> String {
        let english = serde_json::json!({
            "summary": "Summary of the clause",
            "risk": risk,
            "reason": "Reason for the rating",
            "rewrite": rewrite,
        });
        let arabic = serde_json::json!({
            "summary": "ملخص البند",
            "risk": risk,
            "reason": "سبب التقييم",
            "rewrite": "صياغة أكثر أمانا للبند",
        });
        format!("{}\n{}", english, arabic)
    }

    #[async_trait]
    impl ModelBackend for StubBackend {
        fn model(&self) -> &str {
            "stub-model"
        }

        async fn complete(
            &self,
            prompt: &PromptPayload,
            _temperature: f64,
        ) -> Result<String, ModelError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            tracing::trace!(call = call, "Stub backend called");
            match (self.responder)(prompt) {
                StubReply::Text(text) => Ok(text),
                StubReply::Fail(e) => Err(e),
                StubReply::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(ModelError::Transport("stub hang elapsed".to_string()))
                }
            }
        }
    }
}
