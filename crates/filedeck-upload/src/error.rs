use filedeck_core::AppError;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// No token was available when the batch was submitted. Nothing was queued.
    #[error("Not authenticated. Please login first.")]
    MissingCredential,

    #[error("Upload queue is no longer running")]
    QueueStopped,
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::MissingCredential => AppError::MissingCredential,
            UploadError::QueueStopped => AppError::Config(err.to_string()),
        }
    }
}
