//! Configuration module
//!
//! Client-side settings for the API endpoint, HTTP behaviour and the upload queue.
//! Values come from the environment (optionally seeded from a `.env` file) and can
//! be overridden field by field by the caller.

use std::env;
use std::time::Duration;

const API_URL: &str = "http://localhost:8080";
const API_VERSION: &str = "v1";
const HTTP_TIMEOUT_SECS: u64 = 300;
const REMOVAL_DELAY_MS: u64 = 2000;

/// Client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub api_version: String,
    /// Connect timeout, and total deadline for listing requests. Uploads have no total deadline.
    pub http_timeout_secs: u64,
    /// How long a completed transfer stays visible before it is dropped from the queue.
    pub removal_delay_ms: u64,
    /// Upper bound on transfers running at once. `None` dispatches a whole batch immediately.
    pub max_concurrent_uploads: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: API_URL.to_string(),
            api_version: API_VERSION.to_string(),
            http_timeout_secs: HTTP_TIMEOUT_SECS,
            removal_delay_ms: REMOVAL_DELAY_MS,
            max_concurrent_uploads: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let api_url = env::var("FILEDECK_API_URL")
            .or_else(|_| env::var("API_URL"))
            .unwrap_or_else(|_| API_URL.to_string());

        let max_concurrent_uploads = match env::var("FILEDECK_MAX_CONCURRENT_UPLOADS") {
            Ok(s) if !s.trim().is_empty() => Some(s.trim().parse::<usize>().map_err(|_| {
                anyhow::anyhow!("FILEDECK_MAX_CONCURRENT_UPLOADS must be a positive number")
            })?),
            _ => None,
        };

        let config = ClientConfig {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_version: env::var("FILEDECK_API_VERSION")
                .unwrap_or_else(|_| API_VERSION.to_string()),
            http_timeout_secs: env::var("FILEDECK_HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| HTTP_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(HTTP_TIMEOUT_SECS),
            removal_delay_ms: env::var("FILEDECK_REMOVAL_DELAY_MS")
                .unwrap_or_else(|_| REMOVAL_DELAY_MS.to_string())
                .parse()
                .unwrap_or(REMOVAL_DELAY_MS),
            max_concurrent_uploads,
        };

        tracing::debug!(
            api_url = %config.api_url,
            api_version = %config.api_version,
            max_concurrent_uploads = ?config.max_concurrent_uploads,
            "Loaded client configuration"
        );

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "FILEDECK_API_URL must start with http:// or https://"
            ));
        }

        if self.http_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "FILEDECK_HTTP_TIMEOUT_SECS must be greater than zero"
            ));
        }

        if self.max_concurrent_uploads == Some(0) {
            return Err(anyhow::anyhow!(
                "FILEDECK_MAX_CONCURRENT_UPLOADS must be greater than zero when set"
            ));
        }

        Ok(())
    }

    /// API version prefix (e.g. "/api/v1").
    pub fn api_prefix(&self) -> String {
        format!("/api/{}", self.api_version)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn removal_delay(&self) -> Duration {
        Duration::from_millis(self.removal_delay_ms)
    }
}
