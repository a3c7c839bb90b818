//! Domain methods for the filedeck API client.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::sync::Arc;

use crate::ApiClient;
use filedeck_core::models::{FileRecord, RawFile};
use filedeck_core::{AppError, ProgressSink, TransportError, TransportResponse, UploadTransport};

/// Size of the body chunks handed to the connection; progress is reported per chunk.
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

impl ApiClient {
    /// List every file visible to the token's owner.
    pub async fn list_files(&self, token: &str) -> Result<Vec<FileRecord>, AppError> {
        let files: Vec<FileRecord> = self.get("/files", token).await?;
        tracing::debug!(count = files.len(), "Fetched file list");
        Ok(files)
    }

    /// Upload one file as multipart field `file`, reporting bytes sent to `progress`.
    ///
    /// Any HTTP response is returned as-is; only failures without a response are errors.
    #[tracing::instrument(skip(self, file, token, progress), fields(file.name = %file.name, file.size = file.size))]
    pub async fn upload_file(
        &self,
        file: RawFile,
        token: &str,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<TransportResponse, TransportError> {
        let total = file.data.len() as u64;
        let content_type = file.content_type().to_string();

        let mut sent = 0u64;
        let body = reqwest::Body::wrap_stream(futures::stream::iter(chunk(&file.data)).map(
            move |piece| {
                sent += piece.len() as u64;
                progress.report(sent, total);
                Ok::<Bytes, std::io::Error>(piece)
            },
        ));

        let part = reqwest::multipart::Part::stream_with_length(body, total)
            .file_name(file.name.clone())
            .mime_str(&content_type)
            .map_err(|e| TransportError(format!("invalid content type {}: {}", content_type, e)))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = self.build_url("/upload");
        let request = self.apply_auth(self.client().post(&url), token).multipart(form);

        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Upload request failed before a response");
            TransportError(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status, "Upload response received");

        Ok(TransportResponse { status, body })
    }
}

fn chunk(data: &Bytes) -> Vec<Bytes> {
    (0..data.len())
        .step_by(UPLOAD_CHUNK_SIZE)
        .map(|start| data.slice(start..(start + UPLOAD_CHUNK_SIZE).min(data.len())))
        .collect()
}

#[async_trait]
impl UploadTransport for ApiClient {
    async fn upload(
        &self,
        file: RawFile,
        token: &str,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<TransportResponse, TransportError> {
        self.upload_file(file, token, progress).await
    }
}
