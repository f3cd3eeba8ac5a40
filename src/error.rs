//! Typed errors for the resume extraction pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Every variant carries a
//! stable `kind()` string used for deduplicating the error list in the
//! assembled response.

use thiserror::Error;

/// Errors that can abort a pipeline stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Caller-supplied input failed basic shape checks before any stage ran.
    #[error("invalid input: {reason}")]
    InputInvalid { reason: String },

    /// PDF text acquisition failed.
    #[error("text acquisition failed: {0}")]
    Acquire(#[from] AcquireError),

    /// The inference capability could not be reached or exhausted retries.
    #[error("inference failed: {0}")]
    Inference(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Strict-mode validation found structural errors.
    #[error("schema validation failed: {details}")]
    SchemaValidation { details: String },

    /// Operation was cancelled by the caller.
    #[error("operation cancelled")]
    Cancelled,
}

/// Errors from PDF text acquisition.
///
/// Upload and extraction are distinct failure points so diagnostics can
/// always tell which step of the external two-call workflow broke.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// Remote upload of the document failed.
    #[error("upload failed: {0}")]
    Upload(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Text extraction produced no usable text (inline or external).
    #[error("extraction failed: {0}")]
    Extraction(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An external call exceeded the configured timeout budget.
    #[error("timeout after {budget_ms}ms during {step}")]
    Timeout { step: &'static str, budget_ms: u64 },
}

/// A date phrase matched none of the recognized locale patterns.
///
/// Non-fatal everywhere: callers demote the owning field to `partial`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unparseable date phrase: {phrase:?}")]
pub struct DateError {
    pub phrase: String,
}

impl PipelineError {
    /// Stable kind identifier, used to deduplicate the result's error list.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InputInvalid { .. } => "INPUT_INVALID",
            PipelineError::Acquire(AcquireError::Upload(_)) => "UPLOAD_FAILED",
            PipelineError::Acquire(AcquireError::Extraction(_)) => "EXTRACTION_FAILED",
            PipelineError::Acquire(AcquireError::Timeout { step, .. }) => {
                if *step == "upload" {
                    "UPLOAD_FAILED"
                } else {
                    "EXTRACTION_FAILED"
                }
            }
            PipelineError::Inference(_) => "INFERENCE_FAILED",
            PipelineError::SchemaValidation { .. } => "SCHEMA_VALIDATION_ERROR",
            PipelineError::Cancelled => "CANCELLED",
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for acquisition operations.
pub type AcquireResult<T> = std::result::Result<T, AcquireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_distinguishes_upload_from_extraction() {
        let upload = PipelineError::Acquire(AcquireError::Upload("refused".into()));
        let extract = PipelineError::Acquire(AcquireError::Extraction("empty".into()));
        assert_eq!(upload.kind(), "UPLOAD_FAILED");
        assert_eq!(extract.kind(), "EXTRACTION_FAILED");
    }

    #[test]
    fn test_timeout_kind_follows_step() {
        let upload = PipelineError::Acquire(AcquireError::Timeout {
            step: "upload",
            budget_ms: 100,
        });
        let extract = PipelineError::Acquire(AcquireError::Timeout {
            step: "extract",
            budget_ms: 100,
        });
        assert_eq!(upload.kind(), "UPLOAD_FAILED");
        assert_eq!(extract.kind(), "EXTRACTION_FAILED");
    }
}
