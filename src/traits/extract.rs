//! PDF text acquisition capabilities.
//!
//! Two strategies exist for turning PDF bytes into plain text: an
//! in-process extractor for small documents and a two-step remote
//! workflow (upload, then extract) for large ones. The acquirer in
//! [`crate::acquire`] picks between them by size; implementations here
//! only need to do the work.

use async_trait::async_trait;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Opaque reference returned by an upload, consumable only by the
/// matching [`ExternalExtractor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadHandle(pub String);

/// In-process text extraction for small documents.
#[async_trait]
pub trait InlineExtractor: Send + Sync {
    /// Extract plain text from raw PDF bytes.
    ///
    /// A failure here indicates malformed input, not a capacity problem;
    /// the acquirer will not fall back to the external path.
    async fn extract(&self, bytes: &[u8]) -> Result<String, BoxError>;
}

/// Remote upload step of the external extraction workflow.
#[async_trait]
pub trait ExternalUploader: Send + Sync {
    /// Upload the document, returning a handle for extraction.
    async fn upload(&self, bytes: &[u8]) -> Result<UploadHandle, BoxError>;
}

/// Remote extraction step, consuming the uploader's handle.
#[async_trait]
pub trait ExternalExtractor: Send + Sync {
    async fn extract(&self, handle: &UploadHandle) -> Result<String, BoxError>;
}
