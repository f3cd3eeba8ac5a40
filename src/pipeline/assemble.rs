//! Response assembly: the final, externally visible pipeline outcome.
//!
//! Field names and types of [`PipelineResult`] are a compatibility
//! surface for the transport layer and must remain stable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::acquire::AcquisitionPath;
use crate::error::PipelineError;
use crate::schema::record::CANONICAL_FIELDS;
use crate::schema::{CanonicalResumeRecord, ValidationMode, ValidationOutcome};

/// The externally visible outcome of one pipeline run.
///
/// Created once per request; immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub success: bool,
    pub data: Option<CanonicalResumeRecord>,
    pub unmapped_fields: Vec<String>,
    pub partial_fields: Vec<String>,
    pub errors: Vec<String>,
    pub processing_time_ms: u64,
    pub metadata: ResultMetadata,
}

/// Diagnostic metadata attached to every result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// Deployment version of this crate.
    pub version: String,

    /// Identifier of the inference capability actually used.
    pub capability: String,

    pub timestamp: DateTime<Utc>,

    pub request_id: Uuid,

    /// Language hint the run executed under.
    pub language: String,

    /// Fingerprint of the instruction payload sent to the model.
    pub prompt_hash: String,

    /// Which acquisition strategy ran; absent for plain-text input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquisition_path: Option<AcquisitionPath>,
}

impl ResultMetadata {
    pub fn new(capability: impl Into<String>, language: impl Into<String>, prompt_hash: impl Into<String>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            capability: capability.into(),
            timestamp: Utc::now(),
            request_id: Uuid::new_v4(),
            language: language.into(),
            prompt_hash: prompt_hash.into(),
            acquisition_path: None,
        }
    }

    pub fn with_acquisition_path(mut self, path: AcquisitionPath) -> Self {
        self.acquisition_path = Some(path);
        self
    }
}

/// Assemble a result from a completed validation walk.
///
/// `success = data present AND (errors empty OR mode flexible)`; the
/// partially-built record is returned even when strict validation failed,
/// for diagnostics.
pub fn assemble(
    outcome: ValidationOutcome,
    mode: ValidationMode,
    elapsed_ms: u64,
    metadata: ResultMetadata,
) -> PipelineResult {
    let errors = dedupe_by_kind(outcome.errors);
    let success = errors.is_empty() || mode == ValidationMode::Flexible;

    PipelineResult {
        success,
        data: Some(outcome.record),
        unmapped_fields: outcome.unmapped,
        partial_fields: outcome.partial,
        errors,
        processing_time_ms: elapsed_ms,
        metadata,
    }
}

/// Assemble a result for a hard stage failure.
///
/// No stage output survives a hard failure, so every canonical field is
/// reported unmapped and `data` is null.
pub fn assemble_failure(
    error: &PipelineError,
    elapsed_ms: u64,
    metadata: ResultMetadata,
) -> PipelineResult {
    PipelineResult {
        success: false,
        data: None,
        unmapped_fields: CANONICAL_FIELDS.iter().map(|f| f.to_string()).collect(),
        partial_fields: vec![],
        errors: vec![format!("{}: {}", error.kind(), error)],
        processing_time_ms: elapsed_ms,
        metadata,
    }
}

/// Keep the first error string per kind.
///
/// The kind is the `UPPER_SNAKE` prefix before the first colon; strings
/// without one count as their own kind.
fn dedupe_by_kind(errors: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for error in errors {
        let kind = error
            .split_once(':')
            .map(|(k, _)| k.to_string())
            .unwrap_or_else(|| error.clone());
        if !seen.contains(&kind) {
            seen.push(kind);
            out.push(error);
        }
    }
    out
}
