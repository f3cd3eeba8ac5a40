//! Inference orchestration: prompt selection, bounded calls, bounded retry.

pub mod openai;
pub mod prompts;

use std::sync::Arc;

use serde_json::Value;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::schema::parse_candidate;
use crate::traits::{InferenceCapability, InferenceError};
use crate::types::PipelineConfig;

pub use openai::OpenAiInference;
pub use prompts::{prompt_for_language, prompt_hash, EXTRACT_PROMPT_EN, EXTRACT_PROMPT_RU};

/// Drives the text-to-structured-data inference call.
///
/// Holds only the capability and immutable configuration, so it is safe
/// to invoke concurrently for independent requests.
pub struct InferenceOrchestrator {
    capability: Arc<dyn InferenceCapability>,
}

impl InferenceOrchestrator {
    pub fn new(capability: Arc<dyn InferenceCapability>) -> Self {
        Self { capability }
    }

    /// Identifier of the underlying capability, for result metadata.
    pub fn capability_name(&self) -> String {
        self.capability.name().to_string()
    }

    /// Run inference over `text` with a language-appropriate prompt.
    ///
    /// Transient capability failures (including timeouts) are retried up
    /// to the configured count with exponential backoff. Fatal failures
    /// and malformed-but-present output are not retried: the latter comes
    /// back as `Value::Null` and is the validator's concern.
    pub async fn extract_structured(
        &self,
        text: &str,
        language_hint: &str,
        config: &PipelineConfig,
    ) -> Result<Value, PipelineError> {
        let prompt = prompt_for_language(language_hint);
        let max_attempts = config.inference_retries + 1;
        let mut backoff = config.retry_backoff_base;

        for attempt in 1..=max_attempts {
            debug!(attempt, max_attempts, language = language_hint, "inference attempt");

            let outcome = timeout(config.inference_timeout, self.capability.run(prompt, text))
                .await
                .unwrap_or_else(|_| {
                    Err(InferenceError::Transient(format!(
                        "timed out after {:?}",
                        config.inference_timeout
                    )))
                });

            match outcome {
                Ok(raw) => {
                    let candidate = parse_candidate(&raw).unwrap_or(Value::Null);
                    if candidate.is_null() {
                        warn!(
                            response_len = raw.len(),
                            "inference output contained no JSON object"
                        );
                    }
                    return Ok(candidate);
                }
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    warn!(attempt, error = %err, delay = ?backoff, "transient inference failure, backing off");
                    sleep(backoff).await;
                    backoff *= 2;
                }
                Err(err) => {
                    warn!(attempt, error = %err, "inference failed");
                    return Err(PipelineError::Inference(Box::new(err)));
                }
            }
        }

        unreachable!("retry loop always returns")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockInference;
    use std::time::Duration;

    fn fast_config(retries: u32) -> PipelineConfig {
        PipelineConfig::new()
            .with_inference_retries(retries)
            .with_retry_backoff_base(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_returns_parsed_candidate() {
        let mock = Arc::new(MockInference::new().with_response(r#"{"summary": "dev"}"#));
        let orchestrator = InferenceOrchestrator::new(mock.clone());

        let candidate = orchestrator
            .extract_structured("resume text", "en", &fast_config(2))
            .await
            .unwrap();

        assert_eq!(candidate["summary"], "dev");
        assert_eq!(mock.attempts(), 1);
    }

    #[tokio::test]
    async fn test_transient_failures_retried_up_to_bound() {
        // N+1 consecutive transient failures with N retries: exactly N+1
        // attempts, then INFERENCE_FAILED.
        let mock = Arc::new(MockInference::new().with_transient_failures(3));
        let orchestrator = InferenceOrchestrator::new(mock.clone());

        let err = orchestrator
            .extract_structured("text", "en", &fast_config(2))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "INFERENCE_FAILED");
        assert_eq!(mock.attempts(), 3);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let mock = Arc::new(
            MockInference::new()
                .with_transient_failures(1)
                .with_response(r#"{"summary": "ok"}"#),
        );
        let orchestrator = InferenceOrchestrator::new(mock.clone());

        let candidate = orchestrator
            .extract_structured("text", "en", &fast_config(2))
            .await
            .unwrap();

        assert_eq!(candidate["summary"], "ok");
        assert_eq!(mock.attempts(), 2);
    }

    #[tokio::test]
    async fn test_timed_out_call_is_retried_then_fails() {
        // A call exceeding the budget counts as a transient failure: it is
        // retried up to the bound, and exhaustion surfaces INFERENCE_FAILED.
        let mock = Arc::new(
            MockInference::new()
                .with_delay(Duration::from_millis(100))
                .with_response("{}"),
        );
        let orchestrator = InferenceOrchestrator::new(mock.clone());
        let config = fast_config(1).with_inference_timeout(Duration::from_millis(5));

        let err = orchestrator
            .extract_structured("text", "en", &config)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "INFERENCE_FAILED");
        assert_eq!(mock.attempts(), 2);
    }

    #[tokio::test]
    async fn test_fatal_failure_not_retried() {
        let mock = Arc::new(MockInference::new().with_fatal_failure("bad auth"));
        let orchestrator = InferenceOrchestrator::new(mock.clone());

        let err = orchestrator
            .extract_structured("text", "en", &fast_config(5))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "INFERENCE_FAILED");
        assert_eq!(mock.attempts(), 1);
    }

    #[tokio::test]
    async fn test_garbage_output_not_retried() {
        let mock = Arc::new(MockInference::new().with_response("I cannot help with that."));
        let orchestrator = InferenceOrchestrator::new(mock.clone());

        let candidate = orchestrator
            .extract_structured("text", "en", &fast_config(5))
            .await
            .unwrap();

        assert!(candidate.is_null());
        assert_eq!(mock.attempts(), 1);
    }

    #[tokio::test]
    async fn test_language_hint_selects_prompt() {
        let mock = Arc::new(MockInference::new().with_response("{}"));
        let orchestrator = InferenceOrchestrator::new(mock.clone());

        orchestrator
            .extract_structured("текст", "ru", &fast_config(0))
            .await
            .unwrap();

        assert_eq!(mock.last_prompt().unwrap(), EXTRACT_PROMPT_RU);
    }
}
