//! Dashboard filter engine
//!
//! Derives the visible subset of a file list from a [`FilterSpec`]. The result is
//! recomputed from scratch whenever the list or the filter changes; nothing is cached
//! and input records are never modified.

use serde::Serialize;

use crate::models::{FileRecord, FilterSpec, MimeFilter};

/// Returns the records matching every criterion of `spec`, in input order.
pub fn apply(records: &[FileRecord], spec: &FilterSpec) -> Vec<FileRecord> {
    let search = spec.search.to_lowercase();
    records
        .iter()
        .filter(|record| matches_with(record, spec, &search))
        .cloned()
        .collect()
}

/// Whether one record satisfies all six criteria.
pub fn matches(record: &FileRecord, spec: &FilterSpec) -> bool {
    matches_with(record, spec, &spec.search.to_lowercase())
}

fn matches_with(record: &FileRecord, spec: &FilterSpec, search_lower: &str) -> bool {
    matches_search(record, search_lower)
        && matches_mime(record, &spec.mime_type)
        && spec.size_range.contains(record.size)
        && spec
            .date_range
            .as_ref()
            .map_or(true, |range| range.contains(&record.uploaded_at))
        && matches_tags(record, spec)
        && matches_uploader(record, &spec.uploader)
}

fn matches_search(record: &FileRecord, search_lower: &str) -> bool {
    search_lower.is_empty() || record.filename.to_lowercase().contains(search_lower)
}

fn matches_mime(record: &FileRecord, filter: &MimeFilter) -> bool {
    match filter {
        MimeFilter::All => true,
        MimeFilter::Contains(needle) => record.mime.contains(needle.as_str()),
    }
}

// OR within the tag category.
fn matches_tags(record: &FileRecord, spec: &FilterSpec) -> bool {
    spec.tags.is_empty() || record.tags().iter().any(|tag| spec.tags.contains(tag))
}

fn matches_uploader(record: &FileRecord, uploader: &str) -> bool {
    if uploader.is_empty() {
        return true;
    }
    record
        .uploader
        .as_deref()
        .is_some_and(|u| u.contains(uploader))
}

/// "Showing X of Y files".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    pub shown: usize,
    pub total: usize,
}

impl FilterSummary {
    pub fn new(shown: usize, total: usize) -> Self {
        Self { shown, total }
    }
}

impl std::fmt::Display for FilterSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Showing {} of {} files", self.shown, self.total)
    }
}
