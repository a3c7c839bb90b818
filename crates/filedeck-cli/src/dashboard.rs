//! File listing state for the dashboard view.

use filedeck_api_client::ApiClient;
use filedeck_core::models::{FileRecord, FilterSpec};
use filedeck_core::{filter, AppError, FilterSummary, LogLevel, TokenSource};

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    /// No credential, or the server refused it.
    Unauthenticated,
    /// The listing could not be fetched. Carries the message to show.
    Failed(String),
    Ready(Vec<FileRecord>),
}

impl DashboardState {
    /// Fetches the file listing. Without a token no request is made.
    pub async fn load(client: &ApiClient, tokens: &dyn TokenSource) -> Self {
        let Some(token) = tokens.token() else {
            tracing::warn!("No credential available, skipping file listing");
            return DashboardState::Unauthenticated;
        };

        match client.list_files(&token).await {
            Ok(files) => {
                tracing::debug!(count = files.len(), "Loaded file listing");
                DashboardState::Ready(files)
            }
            Err(e) => Self::from_error(&e),
        }
    }

    pub fn from_error(err: &AppError) -> Self {
        log_error(err);
        if err.is_authentication_error() {
            DashboardState::Unauthenticated
        } else {
            DashboardState::Failed(err.user_message())
        }
    }

    pub fn files(&self) -> &[FileRecord] {
        match self {
            DashboardState::Ready(files) => files,
            _ => &[],
        }
    }

    /// Records passing `spec`, in listing order.
    pub fn visible(&self, spec: &FilterSpec) -> Vec<FileRecord> {
        filter::apply(self.files(), spec)
    }

    pub fn summary(&self, spec: &FilterSpec) -> FilterSummary {
        FilterSummary::new(self.visible(spec).len(), self.files().len())
    }

    /// Message for states that have nothing to list.
    pub fn message(&self) -> Option<String> {
        match self {
            DashboardState::Unauthenticated => Some(AppError::MissingCredential.user_message()),
            DashboardState::Failed(message) => Some(message.clone()),
            DashboardState::Ready(_) => None,
        }
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "File listing failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "File listing failed");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error.detailed_message(),
                error_type = error_type,
                "File listing failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_error_maps_each_level() {
        assert_eq!(
            DashboardState::from_error(&AppError::MissingCredential),
            DashboardState::Unauthenticated
        );
        assert_eq!(
            DashboardState::from_error(&AppError::Rejected {
                status: 403,
                body: "forbidden".to_string(),
            }),
            DashboardState::Unauthenticated
        );
        assert_eq!(
            DashboardState::from_error(&AppError::Rejected {
                status: 502,
                body: String::new(),
            }),
            DashboardState::Failed("status 502".to_string())
        );
        assert_eq!(
            DashboardState::from_error(&AppError::Network("connection refused".to_string())),
            DashboardState::Failed("network error".to_string())
        );
    }
}
