//! Language-model inference capability.

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by an inference capability.
///
/// Only `Transient` failures are eligible for the orchestrator's bounded
/// retry; a `Fatal` error (bad request, auth, quota) fails immediately.
/// A well-formed but garbage response is not an error at all — that is a
/// validation concern downstream.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Server-side or connectivity failure worth retrying.
    #[error("transient inference failure: {0}")]
    Transient(String),

    /// Permanent failure; retrying cannot help.
    #[error("fatal inference failure: {0}")]
    Fatal(String),
}

impl InferenceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, InferenceError::Transient(_))
    }
}

/// A hosted language model turning unstructured text into structured-ish
/// output.
///
/// The returned string is untrusted: it is not guaranteed to be valid
/// structured data and must be defensively parsed by the validator.
#[async_trait]
pub trait InferenceCapability: Send + Sync {
    /// Run the model on `input_text` under `prompt`.
    async fn run(&self, prompt: &str, input_text: &str) -> Result<String, InferenceError>;

    /// Identifier of the concrete capability (reported in result metadata).
    fn name(&self) -> &str;
}
