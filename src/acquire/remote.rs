//! HTTP client for the external PDF extraction service.
//!
//! Implements both halves of the two-step workflow against a service
//! exposing `POST /documents` (upload, returns a handle) and
//! `POST /documents/{handle}/text` (extract). Timeout budgets are
//! enforced by the acquirer, not here.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::traits::{ExternalExtractor, ExternalUploader, UploadHandle};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Remote PDF extraction service client.
#[derive(Clone)]
pub struct RemotePdfService {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct UploadResponse {
    handle: String,
}

#[derive(Deserialize)]
struct ExtractResponse {
    text: String,
}

impl RemotePdfService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: None,
        }
    }

    /// Set a bearer token for the service.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Use a custom HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("Authorization", format!("Bearer {key}")),
            None => request,
        }
    }
}

#[async_trait]
impl ExternalUploader for RemotePdfService {
    async fn upload(&self, bytes: &[u8]) -> Result<UploadHandle, BoxError> {
        let response = self
            .authorize(self.client.post(format!("{}/documents", self.base_url)))
            .header("Content-Type", "application/pdf")
            .body(bytes.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("upload returned HTTP {status}: {body}").into());
        }

        let upload: UploadResponse = response.json().await?;
        Ok(UploadHandle(upload.handle))
    }
}

#[async_trait]
impl ExternalExtractor for RemotePdfService {
    async fn extract(&self, handle: &UploadHandle) -> Result<String, BoxError> {
        let response = self
            .authorize(self.client.post(format!(
                "{}/documents/{}/text",
                self.base_url, handle.0
            )))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("extract returned HTTP {status}: {body}").into());
        }

        let extract: ExtractResponse = response.json().await?;
        Ok(extract.text)
    }
}
