use bytes::Bytes;
use std::path::Path;

use crate::error::AppError;

/// A file selected for upload, fully loaded in memory.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub size: u64,
    pub mime: Option<String>,
    pub data: Bytes,
}

impl RawFile {
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let name = name.into();
        let data = data.into();
        let mime = mime_guess::from_path(&name).first_raw().map(str::to_string);
        Self {
            size: data.len() as u64,
            name,
            mime,
            data,
        }
    }

    /// Reads a local file. The upload name is the final path component.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::InvalidInput(format!("Not a file path: {}", path.display()))
            })?;

        let data = tokio::fs::read(path).await?;
        let mime = mime_guess::from_path(path).first_raw().map(str::to_string);

        Ok(Self {
            name,
            size: data.len() as u64,
            mime,
            data: Bytes::from(data),
        })
    }

    /// MIME type sent with the multipart part.
    pub fn content_type(&self) -> &str {
        self.mime.as_deref().unwrap_or("application/octet-stream")
    }
}
