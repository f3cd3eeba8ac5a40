//! The top-level extraction pipeline.
//!
//! One run per request: `(PDF only) ACQUIRE_TEXT → INFER → VALIDATE →
//! ASSEMBLE`. Stages execute strictly sequentially; any stage's hard
//! failure short-circuits to assembly with `success=false` and a
//! populated error list — the pipeline never lets a failure escape as a
//! panic or unhandled error.

pub mod assemble;

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::acquire::PdfTextAcquirer;
use crate::error::{PipelineError, Result};
use crate::inference::{prompt_for_language, prompt_hash, InferenceOrchestrator};
use crate::schema::{validate, ValidationMode, ValidationOutcome};
use crate::traits::{ExternalExtractor, ExternalUploader, InferenceCapability, InlineExtractor};
use crate::types::{PipelineConfig, RequestOptions};

pub use assemble::{assemble, assemble_failure, PipelineResult, ResultMetadata};

/// Composes acquisition, inference, validation and assembly.
///
/// Holds only shared immutable state; independent requests may run
/// through one pipeline concurrently without locking.
pub struct ExtractionPipeline {
    orchestrator: InferenceOrchestrator,
    acquirer: Option<PdfTextAcquirer>,
    config: PipelineConfig,
}

impl ExtractionPipeline {
    /// Create a text-only pipeline.
    pub fn new(capability: Arc<dyn InferenceCapability>, config: PipelineConfig) -> Self {
        Self {
            orchestrator: InferenceOrchestrator::new(capability),
            acquirer: None,
            config,
        }
    }

    /// Enable PDF input by wiring the extraction backends.
    pub fn with_pdf_backends(
        mut self,
        inline: Arc<dyn InlineExtractor>,
        uploader: Arc<dyn ExternalUploader>,
        extractor: Arc<dyn ExternalExtractor>,
    ) -> Self {
        self.acquirer = Some(PdfTextAcquirer::new(inline, uploader, extractor));
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process plain resume text.
    pub async fn process_text(&self, text: &str, opts: &RequestOptions) -> PipelineResult {
        self.process_text_with_cancel(text, opts, CancellationToken::new())
            .await
    }

    /// Process plain resume text, aborting promptly if `cancel` fires.
    pub async fn process_text_with_cancel(
        &self,
        text: &str,
        opts: &RequestOptions,
        cancel: CancellationToken,
    ) -> PipelineResult {
        let started = Instant::now();
        let run = self.run_context(opts);

        if text.trim().is_empty() {
            let error = PipelineError::InputInvalid {
                reason: "empty resume text".to_string(),
            };
            return assemble_failure(&error, elapsed_ms(started), run.metadata);
        }

        match self.infer_and_validate(text, &run, &cancel).await {
            Ok(outcome) => assemble(outcome, run.mode, elapsed_ms(started), run.metadata),
            Err(error) => {
                warn!(kind = error.kind(), error = %error, "pipeline run failed");
                assemble_failure(&error, elapsed_ms(started), run.metadata)
            }
        }
    }

    /// Process a PDF document.
    pub async fn process_pdf(&self, bytes: &[u8], opts: &RequestOptions) -> PipelineResult {
        self.process_pdf_with_cancel(bytes, opts, CancellationToken::new())
            .await
    }

    /// Process a PDF document, aborting promptly if `cancel` fires.
    pub async fn process_pdf_with_cancel(
        &self,
        bytes: &[u8],
        opts: &RequestOptions,
        cancel: CancellationToken,
    ) -> PipelineResult {
        let started = Instant::now();
        let mut run = self.run_context(opts);

        if bytes.is_empty() {
            let error = PipelineError::InputInvalid {
                reason: "empty document".to_string(),
            };
            return assemble_failure(&error, elapsed_ms(started), run.metadata);
        }

        let Some(acquirer) = &self.acquirer else {
            let error = PipelineError::InputInvalid {
                reason: "no PDF extraction backends configured".to_string(),
            };
            return assemble_failure(&error, elapsed_ms(started), run.metadata);
        };

        let acquired = cancellable(&cancel, acquirer.acquire_text(bytes, &self.config)).await;
        let (text, path) = match acquired {
            Ok(Ok(pair)) => pair,
            Ok(Err(acquire_error)) => {
                let error = PipelineError::from(acquire_error);
                warn!(kind = error.kind(), error = %error, "text acquisition failed");
                return assemble_failure(&error, elapsed_ms(started), run.metadata);
            }
            Err(cancelled) => {
                return assemble_failure(&cancelled, elapsed_ms(started), run.metadata);
            }
        };

        debug!(path = path.as_str(), text_len = text.len(), "text acquired");
        run.metadata = run.metadata.with_acquisition_path(path);

        match self.infer_and_validate(&text, &run, &cancel).await {
            Ok(outcome) => assemble(outcome, run.mode, elapsed_ms(started), run.metadata),
            Err(error) => {
                warn!(kind = error.kind(), error = %error, "pipeline run failed");
                assemble_failure(&error, elapsed_ms(started), run.metadata)
            }
        }
    }

    /// INFER then VALIDATE; shared by both entry points.
    async fn infer_and_validate(
        &self,
        text: &str,
        run: &RunContext,
        cancel: &CancellationToken,
    ) -> Result<ValidationOutcome> {
        let candidate = cancellable(
            cancel,
            self.orchestrator
                .extract_structured(text, &run.language, &self.config),
        )
        .await??;

        let outcome = validate(
            &candidate,
            run.mode,
            &self.config.required_fields,
            &run.language,
        );

        info!(
            mapped = outcome.mapped.len(),
            partial = outcome.partial.len(),
            unmapped = outcome.unmapped.len(),
            mode = ?run.mode,
            "pipeline run validated"
        );

        Ok(outcome)
    }

    fn run_context(&self, opts: &RequestOptions) -> RunContext {
        let mode = opts.mode.unwrap_or(self.config.default_mode);
        let language = opts
            .language_hint
            .clone()
            .unwrap_or_else(|| "en".to_string());
        let metadata = ResultMetadata::new(
            self.orchestrator.capability_name(),
            language.clone(),
            prompt_hash(prompt_for_language(&language)),
        );
        RunContext {
            mode,
            language,
            metadata,
        }
    }
}

struct RunContext {
    mode: ValidationMode,
    language: String,
    metadata: ResultMetadata,
}

/// Race a stage against caller cancellation; partial work is discarded.
async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl std::future::Future<Output = T>,
) -> std::result::Result<T, PipelineError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(PipelineError::Cancelled),
        out = fut => Ok(out),
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::AcquisitionPath;
    use crate::testing::{MockInference, MockPdfService};

    fn text_pipeline(mock: Arc<MockInference>) -> ExtractionPipeline {
        ExtractionPipeline::new(
            mock,
            PipelineConfig::new()
                .with_retry_backoff_base(std::time::Duration::from_millis(1)),
        )
    }

    #[tokio::test]
    async fn test_empty_text_is_input_invalid() {
        let pipeline = text_pipeline(Arc::new(MockInference::new()));
        let result = pipeline.process_text("   ", &RequestOptions::new()).await;

        assert!(!result.success);
        assert!(result.data.is_none());
        assert!(result.errors[0].starts_with("INPUT_INVALID"));
    }

    #[tokio::test]
    async fn test_pdf_without_backends_fails_cleanly() {
        let pipeline = text_pipeline(Arc::new(MockInference::new()));
        let result = pipeline.process_pdf(&[1, 2, 3], &RequestOptions::new()).await;

        assert!(!result.success);
        assert!(result.errors[0].starts_with("INPUT_INVALID"));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_inference() {
        let mock = Arc::new(MockInference::new().with_delay(std::time::Duration::from_secs(5)));
        let pipeline = text_pipeline(mock);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = pipeline
            .process_text_with_cancel("resume", &RequestOptions::new(), cancel)
            .await;

        assert!(!result.success);
        assert!(result.errors[0].starts_with("CANCELLED"));
    }

    #[tokio::test]
    async fn test_metadata_records_acquisition_path() {
        let inference = Arc::new(MockInference::new().with_response("{}"));
        let pdf = Arc::new(MockPdfService::new().with_text("resume text"));
        let pipeline = ExtractionPipeline::new(
            inference,
            PipelineConfig::new().with_size_threshold(1024),
        )
        .with_pdf_backends(pdf.clone(), pdf.clone(), pdf);

        let result = pipeline.process_pdf(&[0u8; 10], &RequestOptions::new()).await;
        assert!(result.success);
        assert_eq!(
            result.metadata.acquisition_path,
            Some(AcquisitionPath::Inline)
        );
    }
}
