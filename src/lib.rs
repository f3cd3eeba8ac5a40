//! Resume Extraction Pipeline
//!
//! Turns a candidate's resume — free-form text or PDF bytes — into a
//! structured record conforming to a canonical schema, annotating which
//! fields could not be populated and which were only partially populated.
//!
//! # Design Philosophy
//!
//! - Model output is untrusted: validation is a defensive, field-by-field
//!   coercion pass, never a strict deserializer
//! - Absence is a legitimate terminal state, not an error
//! - Every external call is bounded by a timeout; retry happens in
//!   exactly one place (inference) and is itself bounded
//! - A pipeline run always ends in a well-formed [`PipelineResult`],
//!   never an escaping error
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use resume_extraction::{ExtractionPipeline, PipelineConfig, RequestOptions};
//! use resume_extraction::inference::OpenAiInference;
//!
//! let inference = Arc::new(OpenAiInference::from_env()?);
//! let pipeline = ExtractionPipeline::new(inference, PipelineConfig::default());
//!
//! let result = pipeline
//!     .process_text(resume_text, &RequestOptions::new().with_language_hint("en"))
//!     .await;
//! assert!(result.success);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Capability seams (inline/external PDF extraction, inference)
//! - [`schema`] - Canonical record and the defensive validator
//! - [`dates`] - Locale-aware date normalization
//! - [`acquire`] - PDF text acquisition with size-based routing
//! - [`inference`] - Prompt selection, bounded calls, bounded retry
//! - [`pipeline`] - Top-level orchestration and response assembly
//! - [`testing`] - Mock capabilities for testing

pub mod acquire;
pub mod dates;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod schema;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{AcquireError, DateError, PipelineError};
pub use traits::{
    ExternalExtractor, ExternalUploader, InferenceCapability, InferenceError, InlineExtractor,
    UploadHandle,
};
pub use types::{PipelineConfig, RequestOptions};

pub use schema::{
    parse_candidate, validate, CanonicalResumeRecord, ExperienceEntry, LinkEntry, Skill,
    SkillEntry, ValidationMode, ValidationOutcome, CANONICAL_FIELDS,
};

pub use acquire::{AcquisitionPath, PdfTextAcquirer, RemotePdfService};

pub use inference::{InferenceOrchestrator, OpenAiInference};

// Re-export the pipeline entry point and result shape
pub use pipeline::{ExtractionPipeline, PipelineResult, ResultMetadata};
