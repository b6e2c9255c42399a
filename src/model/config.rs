use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::app::AppError;

const ENV_CONFIG_PATH: &str = "CONTRACT_RISK_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
const ENV_ANALYSIS_MODEL: &str = "ANALYSIS_MODEL";
const DEFAULT_MODEL: &str = "gpt-4o";

const ENV_LANGFUSE_ENABLED: &str = "LANGFUSE_ENABLED";
const ENV_LANGFUSE_PUBLIC_KEY: &str = "LANGFUSE_PUBLIC_KEY";
const ENV_LANGFUSE_SECRET_KEY: &str = "LANGFUSE_SECRET_KEY";
const ENV_LANGFUSE_HOST: &str = "LANGFUSE_HOST";
const DEFAULT_LANGFUSE_HOST: &str = "https://cloud.langfuse.com";
const ENV_LOG_CLAUSE_CONTENT: &str = "OBSERVABILITY_LOG_CLAUSE_CONTENT";

/// Upper bound on retries of a failed model call
const MAX_RETRY_CEILING: u32 = 1;

/// Analysis policy, loaded from the optional YAML config file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisPolicy {
    /// Sampling temperature for the model call
    pub temperature: f64,
    /// Ceiling on a single model call; a retried request waits at most
    /// `(max_retries + 1) * remote_timeout_secs`
    pub remote_timeout_secs: u64,
    /// Retries of a failed model call (capped at 1)
    pub max_retries: u32,
    /// Minimum trimmed clause length in characters
    pub min_clause_chars: usize,
    /// Maximum trimmed clause length in characters (inclusive)
    pub max_clause_chars: usize,
    /// Maximum clauses per batch request
    pub max_batch_size: usize,
}

impl Default for AnalysisPolicy {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            remote_timeout_secs: 5,
            max_retries: 1,
            min_clause_chars: 10,
            max_clause_chars: 10_000,
            max_batch_size: 10,
        }
    }
}

impl AnalysisPolicy {
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }

    fn validate(mut self) -> Result<Self, AppError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::InvalidConfig(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }
        if self.remote_timeout_secs == 0 {
            return Err(AppError::InvalidConfig(
                "remote_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.min_clause_chars > self.max_clause_chars {
            return Err(AppError::InvalidConfig(format!(
                "min_clause_chars ({}) exceeds max_clause_chars ({})",
                self.min_clause_chars, self.max_clause_chars
            )));
        }
        if self.max_batch_size == 0 {
            return Err(AppError::InvalidConfig(
                "max_batch_size must be greater than zero".to_string(),
            ));
        }
        if self.max_retries > MAX_RETRY_CEILING {
            tracing::warn!(
                requested = self.max_retries,
                ceiling = MAX_RETRY_CEILING,
                "max_retries capped"
            );
            self.max_retries = MAX_RETRY_CEILING;
        }
        Ok(self)
    }
}

/// Tracing backend settings, passed through untouched
#[derive(Clone, Default)]
pub struct ObservabilityConfig {
    pub enabled: bool,
    pub public_key: Option<String>,
    pub secret_key: Option<String>,
    pub host: String,
    /// Whether clause text may appear in log events
    pub log_clause_content: bool,
}

impl fmt::Debug for ObservabilityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservabilityConfig")
            .field("enabled", &self.enabled)
            .field("public_key", &self.public_key.as_ref().map(|_| "<set>"))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("log_clause_content", &self.log_clause_content)
            .finish()
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub analysis: AnalysisPolicy,
}

/// Application configuration, built once at startup
#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub openai_api_key: String,
    pub model: String,
    pub analysis: AnalysisPolicy,
    pub observability: ObservabilityConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("host", &self.host)
            .field("openai_api_key", &"<redacted>")
            .field("model", &self.model)
            .field("analysis", &self.analysis)
            .field("observability", &self.observability)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = lookup(ENV_OPENAI_API_KEY)
            .filter(|k| !k.trim().is_empty())
            .ok_or(AppError::MissingConfig(ENV_OPENAI_API_KEY))?;

        let port = lookup("PORT").and_then(|p| p.parse().ok()).unwrap_or(8000);
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let model = lookup(ENV_ANALYSIS_MODEL)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let config_path =
            lookup(ENV_CONFIG_PATH).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let analysis = Self::load_config_file(&config_path)
            .map(|cf| cf.analysis)
            .unwrap_or_default()
            .validate()?;

        let observability = ObservabilityConfig {
            enabled: is_truthy(lookup(ENV_LANGFUSE_ENABLED)),
            public_key: lookup(ENV_LANGFUSE_PUBLIC_KEY),
            secret_key: lookup(ENV_LANGFUSE_SECRET_KEY),
            host: lookup(ENV_LANGFUSE_HOST).unwrap_or_else(|| DEFAULT_LANGFUSE_HOST.to_string()),
            log_clause_content: is_truthy(lookup(ENV_LOG_CLAUSE_CONTENT)),
        };

        if observability.enabled
            && (observability.public_key.is_none() || observability.secret_key.is_none())
        {
            tracing::warn!(
                host = %observability.host,
                "Observability enabled without public/secret key"
            );
        }

        Ok(Self {
            port,
            host,
            openai_api_key,
            model,
            analysis,
            observability,
        })
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn is_truthy(value: Option<String>) -> bool {
    value
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(AppError::MissingConfig("OPENAI_API_KEY"))));

        let result = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "  ")]));
        assert!(matches!(result, Err(AppError::MissingConfig(_))));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("CONTRACT_RISK_CONFIG_PATH", "/nonexistent/config.yaml"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.analysis, AnalysisPolicy::default());
        assert!(!config.observability.enabled);
        assert!(!config.observability.log_clause_content);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("CONTRACT_RISK_CONFIG_PATH", "/nonexistent/config.yaml"),
            ("PORT", "9000"),
            ("HOST", "0.0.0.0"),
            ("ANALYSIS_MODEL", "gpt-4o-mini"),
            ("LANGFUSE_ENABLED", "TRUE"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.model, "gpt-4o-mini");
        assert!(config.observability.enabled);
        assert_eq!(config.observability.host, "https://cloud.langfuse.com");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-very-secret"),
            ("CONTRACT_RISK_CONFIG_PATH", "/nonexistent/config.yaml"),
            ("LANGFUSE_SECRET_KEY", "lf-secret"),
        ]))
        .unwrap();

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-very-secret"));
        assert!(!rendered.contains("lf-secret"));
    }

    #[test]
    fn test_policy_file_parsing() {
        let file: ConfigFile = serde_yaml::from_str(
            "analysis:\n  max_clause_chars: 5000\n  remote_timeout_secs: 5\n",
        )
        .unwrap();

        assert_eq!(file.analysis.max_clause_chars, 5000);
        assert_eq!(file.analysis.remote_timeout(), Duration::from_secs(5));
        assert_eq!(file.analysis.min_clause_chars, 10);
    }

    #[test]
    fn test_default_remote_budget() {
        let policy = AnalysisPolicy::default();
        let attempts = policy.max_retries + 1;
        assert_eq!(policy.remote_timeout(), Duration::from_secs(5));
        assert!(policy.remote_timeout() * attempts <= Duration::from_secs(10));
    }

    fn config_with_file(contents: &str) -> Result<Config, AppError> {
        let path = std::env::temp_dir()
            .join(format!("contract-risk-{}.yaml", uuid::Uuid::new_v4()));
        fs::write(&path, contents).unwrap();
        let path_str = path.to_string_lossy().to_string();

        let result = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("CONTRACT_RISK_CONFIG_PATH", &path_str),
        ]));
        fs::remove_file(&path).unwrap();
        result
    }

    #[test]
    fn test_empty_config_file_uses_defaults() {
        let config = config_with_file("  \n").unwrap();
        assert_eq!(config.analysis, AnalysisPolicy::default());
    }

    #[test]
    fn test_malformed_config_file_uses_defaults() {
        let config = config_with_file("analysis: [unclosed\n  - : :").unwrap();
        assert_eq!(config.analysis, AnalysisPolicy::default());
    }

    #[test]
    fn test_invalid_policy_in_config_file_is_fatal() {
        let result = config_with_file("analysis: {min_clause_chars: 100, max_clause_chars: 10}\n");
        assert!(matches!(result, Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_file_overrides_applied() {
        let config = config_with_file(
            "analysis:\n  max_clause_chars: 5000\n  remote_timeout_secs: 3\n  max_retries: 4\n",
        )
        .unwrap();

        assert_eq!(config.analysis.max_clause_chars, 5000);
        assert_eq!(config.analysis.remote_timeout(), Duration::from_secs(3));
        assert_eq!(config.analysis.max_retries, 1);
        assert_eq!(config.analysis.min_clause_chars, 10);
    }

    #[test]
    fn test_retries_capped_at_one() {
        let policy = AnalysisPolicy {
            max_retries: 5,
            ..AnalysisPolicy::default()
        }
        .validate()
        .unwrap();
        assert_eq!(policy.max_retries, 1);
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let inverted = AnalysisPolicy {
            min_clause_chars: 100,
            max_clause_chars: 10,
            ..AnalysisPolicy::default()
        };
        assert!(matches!(inverted.validate(), Err(AppError::InvalidConfig(_))));

        let hot = AnalysisPolicy {
            temperature: 3.5,
            ..AnalysisPolicy::default()
        };
        assert!(matches!(hot.validate(), Err(AppError::InvalidConfig(_))));
    }
}
