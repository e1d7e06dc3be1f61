//! The conversion/merge service boundary.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{Result, StageError};

/// One file part of a multipart batch.
#[derive(Debug, Clone)]
pub struct BatchPart {
    /// Form field name, repeated for every part.
    pub field: &'static str,
    /// Part filename (the entry's display name).
    pub file_name: String,
    /// Part content type.
    pub media_type: String,
    /// Part body.
    pub bytes: Bytes,
}

/// Ordered batch posted to one endpoint.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    /// Endpoint path, e.g. `/merge-pdfs`.
    pub endpoint: &'static str,
    /// Operation name for logs and errors.
    pub operation: &'static str,
    /// Parts in staged order.
    pub parts: Vec<BatchPart>,
}

impl BatchRequest {
    /// Part filenames in wire order.
    pub fn file_names(&self) -> Vec<&str> {
        self.parts.iter().map(|part| part.file_name.as_str()).collect()
    }
}

/// Status and body of a completed exchange.
#[derive(Debug, Clone)]
pub struct ServiceResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Bytes,
}

impl ServiceResponse {
    /// A 200 response carrying `body`.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// An empty response with `status`.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Bytes::new(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that turns an ordered batch into one binary artifact.
///
/// `Ok` means the exchange completed, whatever the status; `Err` means it
/// could not complete at all.
#[async_trait]
pub trait ConversionService: Send + Sync {
    /// Post `request` and return the service's answer.
    async fn exchange(&self, request: BatchRequest) -> Result<ServiceResponse>;
}

/// `multipart/form-data` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpService {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpService {
    /// Build a client for the service at `base_url`.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|err| StageError::other(format!("failed to initialize HTTP client: {err}")))?;

        Ok(Self { base_url, client })
    }

    /// Use an already configured client.
    pub fn with_client(base_url: Url, client: reqwest::Client) -> Self {
        Self { base_url, client }
    }

    /// Full URL of `endpoint`, appended to the base path.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|err| StageError::invalid_config(format!("invalid endpoint URL {joined}: {err}")))
    }
}

#[async_trait]
impl ConversionService for HttpService {
    async fn exchange(&self, request: BatchRequest) -> Result<ServiceResponse> {
        let url = self.endpoint_url(request.endpoint)?;
        let operation = request.operation;

        let mut form = Form::new();
        for part in request.parts {
            // A known part length lets reqwest send a Content-Length instead of chunking.
            let len = part.bytes.len() as u64;
            let body = Part::stream_with_length(part.bytes, len)
                .file_name(part.file_name)
                .mime_str(&part.media_type)
                .map_err(|err| StageError::transport(operation, format!("invalid content type: {err}")))?;
            form = form.part(part.field, body);
        }

        debug!(%url, operation, "posting batch");
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| StageError::transport(operation, err.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| StageError::transport(operation, format!("failed to read response body: {err}")))?;

        Ok(ServiceResponse { status, body })
    }
}
