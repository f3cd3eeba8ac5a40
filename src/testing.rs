//! Testing utilities including mock capability implementations.
//!
//! These are useful for testing applications that use the pipeline
//! without real model or network calls. Mocks return deterministic,
//! configurable responses and track every call for assertions.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::traits::{
    ExternalExtractor, ExternalUploader, InferenceCapability, InferenceError, InlineExtractor,
    UploadHandle,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A mock inference capability with scripted responses and failures.
#[derive(Default)]
pub struct MockInference {
    /// Scripted responses, consumed in order; the last one repeats.
    responses: Arc<RwLock<Vec<String>>>,

    /// Fail this many initial attempts with a transient error.
    transient_failures: usize,

    /// Always fail with this fatal message.
    fatal: Option<String>,

    /// Simulated latency per call.
    delay: Option<Duration>,

    attempts: AtomicUsize,

    prompts: Arc<RwLock<Vec<String>>>,
}

impl MockInference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a scripted response.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.write().unwrap().push(response.into());
        self
    }

    /// Fail the first `n` attempts with a transient error.
    pub fn with_transient_failures(mut self, n: usize) -> Self {
        self.transient_failures = n;
        self
    }

    /// Fail every attempt with a fatal error.
    pub fn with_fatal_failure(mut self, message: impl Into<String>) -> Self {
        self.fatal = Some(message.into());
        self
    }

    /// Sleep before answering, to exercise timeouts and cancellation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Total calls made so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// The prompt of the most recent call.
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.read().unwrap().last().cloned()
    }
}

#[async_trait]
impl InferenceCapability for MockInference {
    async fn run(&self, prompt: &str, _input_text: &str) -> Result<String, InferenceError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        self.prompts.write().unwrap().push(prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.fatal {
            return Err(InferenceError::Fatal(message.clone()));
        }

        if attempt <= self.transient_failures {
            return Err(InferenceError::Transient(format!(
                "simulated server error on attempt {attempt}"
            )));
        }

        let responses = self.responses.read().unwrap();
        let index = (attempt - self.transient_failures - 1).min(responses.len().saturating_sub(1));
        Ok(responses
            .get(index)
            .cloned()
            .unwrap_or_else(|| "{}".to_string()))
    }

    fn name(&self) -> &str {
        "mock-inference"
    }
}

/// Record of a call made to [`MockPdfService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfCall {
    InlineExtract { size: usize },
    Upload { size: usize },
    RemoteExtract { handle: String },
}

/// A mock PDF service implementing all three acquisition capabilities.
#[derive(Default)]
pub struct MockPdfService {
    text: Arc<RwLock<String>>,
    inline_failure: Option<String>,
    upload_failure: Option<String>,
    remote_failure: Option<String>,
    delay: Option<Duration>,
    handle_counter: AtomicUsize,
    calls: Arc<RwLock<Vec<PdfCall>>>,
}

impl MockPdfService {
    pub fn new() -> Self {
        let service = Self::default();
        *service.text.write().unwrap() = "extracted resume text".to_string();
        service
    }

    /// Set the text both paths return.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        *self.text.write().unwrap() = text.into();
        self
    }

    /// Make the inline extractor fail.
    pub fn with_inline_failure(mut self, message: impl Into<String>) -> Self {
        self.inline_failure = Some(message.into());
        self
    }

    /// Make the upload step fail.
    pub fn with_upload_failure(mut self, message: impl Into<String>) -> Self {
        self.upload_failure = Some(message.into());
        self
    }

    /// Make the remote extract step fail.
    pub fn with_remote_failure(mut self, message: impl Into<String>) -> Self {
        self.remote_failure = Some(message.into());
        self
    }

    /// Sleep before answering each call, to exercise timeout budgets.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn simulate_latency(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    /// All calls made to this mock, in order.
    pub fn calls(&self) -> Vec<PdfCall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl InlineExtractor for MockPdfService {
    async fn extract(&self, bytes: &[u8]) -> Result<String, BoxError> {
        self.calls
            .write()
            .unwrap()
            .push(PdfCall::InlineExtract { size: bytes.len() });
        self.simulate_latency().await;

        match &self.inline_failure {
            Some(message) => Err(message.clone().into()),
            None => Ok(self.text.read().unwrap().clone()),
        }
    }
}

#[async_trait]
impl ExternalUploader for MockPdfService {
    async fn upload(&self, bytes: &[u8]) -> Result<UploadHandle, BoxError> {
        self.calls
            .write()
            .unwrap()
            .push(PdfCall::Upload { size: bytes.len() });
        self.simulate_latency().await;

        match &self.upload_failure {
            Some(message) => Err(message.clone().into()),
            None => {
                let n = self.handle_counter.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(UploadHandle(format!("mock-handle-{n}")))
            }
        }
    }
}

#[async_trait]
impl ExternalExtractor for MockPdfService {
    async fn extract(&self, handle: &UploadHandle) -> Result<String, BoxError> {
        self.calls.write().unwrap().push(PdfCall::RemoteExtract {
            handle: handle.0.clone(),
        });
        self.simulate_latency().await;

        match &self.remote_failure {
            Some(message) => Err(message.clone().into()),
            None => Ok(self.text.read().unwrap().clone()),
        }
    }
}
