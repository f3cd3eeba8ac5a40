//! Capability seams consumed by the pipeline.
//!
//! These traits define the interfaces other subsystems implement to
//! provide PDF text extraction and language-model inference.

pub mod extract;
pub mod inference;

pub use extract::{ExternalExtractor, ExternalUploader, InlineExtractor, UploadHandle};
pub use inference::{InferenceCapability, InferenceError};
