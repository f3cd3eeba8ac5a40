//! Pipeline configuration.
//!
//! Constructed once at process start and passed into each component;
//! read-only afterwards, so any number of in-flight pipeline runs may
//! share it without synchronization.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::schema::ValidationMode;

/// Process-wide, immutable pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Documents at or above this many bytes take the external
    /// upload-then-extract path; smaller ones are extracted in-process.
    pub size_threshold_bytes: usize,

    /// Maximum automatic retries after a transient inference failure.
    /// Total attempts = retries + 1.
    pub inference_retries: u32,

    /// First retry delay; doubles on each subsequent retry.
    pub retry_backoff_base: Duration,

    /// Budget for a single inference call. Inference latency for this
    /// domain is commonly tens of seconds, so the default is generous.
    pub inference_timeout: Duration,

    /// Budget applied to each of the two external acquisition calls.
    pub acquire_timeout: Duration,

    /// Mode used when the request does not choose one.
    pub default_mode: ValidationMode,

    /// Fields whose absence is a hard error under strict validation.
    /// Empty by default: every canonical field is independently optional.
    #[serde(default)]
    pub required_fields: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            size_threshold_bytes: 2 * 1024 * 1024,
            inference_retries: 2,
            retry_backoff_base: Duration::from_secs(2),
            inference_timeout: Duration::from_secs(90),
            acquire_timeout: Duration::from_secs(30),
            default_mode: ValidationMode::Flexible,
            required_fields: vec![],
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inline/external size threshold.
    pub fn with_size_threshold(mut self, bytes: usize) -> Self {
        self.size_threshold_bytes = bytes;
        self
    }

    /// Set the inference retry count.
    pub fn with_inference_retries(mut self, retries: u32) -> Self {
        self.inference_retries = retries;
        self
    }

    /// Set the base retry backoff.
    pub fn with_retry_backoff_base(mut self, base: Duration) -> Self {
        self.retry_backoff_base = base;
        self
    }

    /// Set the inference call timeout.
    pub fn with_inference_timeout(mut self, timeout: Duration) -> Self {
        self.inference_timeout = timeout;
        self
    }

    /// Set the acquisition call timeout.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Set the default validation mode.
    pub fn with_default_mode(mut self, mode: ValidationMode) -> Self {
        self.default_mode = mode;
        self
    }

    /// Mark fields as required under strict validation.
    pub fn with_required_fields(
        mut self,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.required_fields = fields.into_iter().map(|f| f.into()).collect();
        self
    }
}

/// Per-request options, immutable for the duration of one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Validation mode override; falls back to the config default.
    pub mode: Option<ValidationMode>,

    /// Language hint steering prompt selection and date normalization
    /// ("en", "ru", ...). Defaults to English.
    pub language_hint: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_language_hint(mut self, hint: impl Into<String>) -> Self {
        self.language_hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let config = PipelineConfig::new()
            .with_size_threshold(1024)
            .with_inference_retries(5)
            .with_default_mode(ValidationMode::Strict)
            .with_required_fields(["summary"]);

        assert_eq!(config.size_threshold_bytes, 1024);
        assert_eq!(config.inference_retries, 5);
        assert_eq!(config.default_mode, ValidationMode::Strict);
        assert_eq!(config.required_fields, vec!["summary"]);
    }
}
