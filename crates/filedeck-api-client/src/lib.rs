//! HTTP client for the filedeck file API.
//!
//! Provides a minimal client with per-request bearer auth, a generic GET helper,
//! and domain methods (list files, upload with progress). The upload orchestrator
//! uses this client through the [`filedeck_core::UploadTransport`] trait.

pub mod api;

use anyhow::{Context, Result};
use filedeck_core::{AppError, ClientConfig};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for the filedeck API.
///
/// The configured HTTP timeout bounds connecting and JSON requests. Upload bodies are
/// not bounded so large files on slow links can finish.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_prefix: String,
    request_timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.http_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_prefix: config.api_prefix(),
            request_timeout: config.http_timeout(),
        })
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.api_prefix, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder, token: &str) -> reqwest::RequestBuilder {
        request.bearer_auth(token)
    }

    /// GET request with bearer auth. Deserializes JSON response.
    #[tracing::instrument(skip(self, token))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T, AppError> {
        let url = self.build_url(path);
        let request = self
            .apply_auth(self.client.get(&url), token)
            .timeout(self.request_timeout);

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), path = %path, "API request rejected");
            return Err(AppError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Raw client for custom requests.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

pub use api::UPLOAD_CHUNK_SIZE;
