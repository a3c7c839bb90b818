use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File metadata as returned by the list endpoint.
///
/// Records are never modified client-side; the filter engine only selects a subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub filename: String,
    pub mime: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
}

impl FileRecord {
    pub fn kind(&self) -> FileKind {
        FileKind::from_mime(&self.mime)
    }

    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }

    /// Tag badges shown on a file card: the first two tags, then a `+N` overflow badge.
    pub fn tag_badges(&self) -> Vec<String> {
        const SHOWN: usize = 2;

        let tags = self.tags();
        let mut badges: Vec<String> = tags.iter().take(SHOWN).cloned().collect();
        if tags.len() > SHOWN {
            badges.push(format!("+{}", tags.len() - SHOWN));
        }
        badges
    }
}

/// Coarse file category derived from the MIME type, used to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Video,
    Document,
    Archive,
    Other,
}

impl FileKind {
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            FileKind::Image
        } else if mime.starts_with("video/") {
            FileKind::Video
        } else if mime.contains("pdf") || mime.contains("document") {
            FileKind::Document
        } else if mime.contains("zip") || mime.contains("archive") {
            FileKind::Archive
        } else {
            FileKind::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Video => "video",
            FileKind::Document => "document",
            FileKind::Archive => "archive",
            FileKind::Other => "file",
        }
    }
}

/// Upper-cased MIME subtype (`image/png` -> `PNG`), or `FILE` when there is none.
pub fn subtype_label(mime: &str) -> String {
    match mime.split_once('/') {
        Some((_, subtype)) if !subtype.is_empty() => subtype.to_uppercase(),
        _ => "FILE".to_string(),
    }
}
