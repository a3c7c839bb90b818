//! Upload transport seam
//!
//! The orchestrator drives transfers through an [`UploadTransport`]; the HTTP client
//! crate provides the real implementation and tests provide scripted ones.

use async_trait::async_trait;
use std::sync::Arc;

use crate::models::RawFile;

/// Receives byte-level progress while a request body is being sent.
pub trait ProgressSink: Send + Sync {
    /// Called with bytes handed to the connection so far and the total body size.
    fn report(&self, sent: u64, total: u64);
}

impl<F> ProgressSink for F
where
    F: Fn(u64, u64) + Send + Sync,
{
    fn report(&self, sent: u64, total: u64) {
        self(sent, total)
    }
}

/// Final HTTP status and body of an upload request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Diagnostic for a failed response: the body, or `status <code>` when empty.
    pub fn failure_message(&self) -> String {
        if self.body.is_empty() {
            format!("status {}", self.status)
        } else {
            self.body.clone()
        }
    }
}

/// Failure before any response was obtained (connection refused, reset, DNS...).
#[derive(Debug, thiserror::Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

impl TransportError {
    /// Message recorded on the transfer.
    pub const USER_MESSAGE: &'static str = "network error";
}

/// Sends one file to the upload endpoint.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Uploads `file` with `token` as bearer credential, reporting progress to `progress`.
    ///
    /// Any received response, successful or not, is `Ok`; `Err` means no response.
    async fn upload(
        &self,
        file: RawFile,
        token: &str,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<TransportResponse, TransportError>;
}
