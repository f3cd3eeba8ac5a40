//! PDF text acquisition with size-based strategy routing.
//!
//! Small documents are extracted in-process; large ones go through the
//! external upload-then-extract workflow. The two strategies never fall
//! back to each other: an inline failure on a small file means malformed
//! input, and a broken remote step is surfaced as exactly that step.

pub mod remote;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{AcquireError, AcquireResult};
use crate::traits::{ExternalExtractor, ExternalUploader, InlineExtractor};
use crate::types::PipelineConfig;

pub use remote::RemotePdfService;

/// Which strategy produced the text, reported in result metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcquisitionPath {
    Inline,
    External,
}

impl AcquisitionPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcquisitionPath::Inline => "inline",
            AcquisitionPath::External => "external",
        }
    }
}

/// Routes PDF bytes to the inline or external extraction strategy.
///
/// Holds no per-call state; safe to share across concurrent requests.
pub struct PdfTextAcquirer {
    inline: Arc<dyn InlineExtractor>,
    uploader: Arc<dyn ExternalUploader>,
    extractor: Arc<dyn ExternalExtractor>,
}

impl PdfTextAcquirer {
    pub fn new(
        inline: Arc<dyn InlineExtractor>,
        uploader: Arc<dyn ExternalUploader>,
        extractor: Arc<dyn ExternalExtractor>,
    ) -> Self {
        Self {
            inline,
            uploader,
            extractor,
        }
    }

    /// Extract plain text from PDF bytes, choosing the path by size.
    ///
    /// Both external calls share the same timeout budget from `config`;
    /// a timeout maps to the same error kind as a reported failure. No
    /// retry happens here — retry policy belongs to the caller.
    pub async fn acquire_text(
        &self,
        bytes: &[u8],
        config: &PipelineConfig,
    ) -> AcquireResult<(String, AcquisitionPath)> {
        let budget = config.acquire_timeout;
        let budget_ms = budget.as_millis() as u64;

        if bytes.len() < config.size_threshold_bytes {
            debug!(size = bytes.len(), "acquiring text via inline extractor");
            let text = timeout(budget, self.inline.extract(bytes))
                .await
                .map_err(|_| AcquireError::Timeout {
                    step: "extract",
                    budget_ms,
                })?
                .map_err(AcquireError::Extraction)?;
            return Ok((non_empty(text)?, AcquisitionPath::Inline));
        }

        debug!(size = bytes.len(), "acquiring text via external workflow");

        let handle = timeout(budget, self.uploader.upload(bytes))
            .await
            .map_err(|_| AcquireError::Timeout {
                step: "upload",
                budget_ms,
            })?
            .map_err(|e| {
                warn!(error = %e, "external upload failed");
                AcquireError::Upload(e)
            })?;

        let text = timeout(budget, self.extractor.extract(&handle))
            .await
            .map_err(|_| AcquireError::Timeout {
                step: "extract",
                budget_ms,
            })?
            .map_err(|e| {
                warn!(error = %e, "external extraction failed");
                AcquireError::Extraction(e)
            })?;

        Ok((non_empty(text)?, AcquisitionPath::External))
    }
}

/// Empty extracted text is a failure: downstream inference on empty
/// input is not useful.
fn non_empty(text: String) -> AcquireResult<String> {
    if text.trim().is_empty() {
        Err(AcquireError::Extraction(
            "extractor returned empty text".into(),
        ))
    } else {
        Ok(text)
    }
}
