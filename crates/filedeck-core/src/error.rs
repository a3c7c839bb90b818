//! Error types module
//!
//! All client-side failures are unified under the `AppError` enum: missing
//! credentials, network failures, remote rejections, invalid input and local
//! I/O or decoding problems. Each variant describes how it should be logged and
//! what the user should be told.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for remote rejections the user can act on
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing credential: no authentication token available")]
    MissingCredential,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the error type name
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::MissingCredential => "MissingCredential",
            AppError::Network(_) => "Network",
            AppError::Rejected { .. } => "Rejected",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Config(_) => "Config",
            AppError::Io(_) => "Io",
            AppError::Json(_) => "Json",
        }
    }

    /// Log level for this error
    pub fn log_level(&self) -> LogLevel {
        match self {
            AppError::MissingCredential | AppError::InvalidInput(_) => LogLevel::Debug,
            AppError::Rejected { .. } | AppError::Config(_) => LogLevel::Warn,
            AppError::Network(_) | AppError::Io(_) | AppError::Json(_) => LogLevel::Error,
        }
    }

    /// Whether the user has to authenticate before anything else can succeed.
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            AppError::MissingCredential | AppError::Rejected { status: 401 | 403, .. }
        )
    }

    /// User-facing message (may differ from internal error message)
    pub fn user_message(&self) -> String {
        match self {
            AppError::MissingCredential => {
                "Authentication required. Please log in to view your files.".to_string()
            }
            AppError::Network(_) => "network error".to_string(),
            AppError::Rejected { status, body } if body.is_empty() => format!("status {}", status),
            AppError::Rejected { body, .. } => body.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::Config(ref msg) => msg.clone(),
            AppError::Io(_) => "Failed to read local file".to_string(),
            AppError::Json(_) => "Failed to parse server response".to_string(),
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}
