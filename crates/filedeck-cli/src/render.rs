//! Text rendering for the upload queue and the file listing.

use std::fmt::Write;

use filedeck_core::format::{format_file_size, truncate_string};
use filedeck_core::models::{subtype_label, FileRecord, TransferRecord, TransferStatus};
use filedeck_core::FilterSummary;
use serde::Serialize;

/// Status column of one queue entry.
pub fn transfer_status(record: &TransferRecord) -> String {
    match record.status {
        TransferStatus::Idle => "waiting".to_string(),
        TransferStatus::Uploading => format!("uploading {}%", record.progress),
        TransferStatus::Done => "Complete".to_string(),
        TransferStatus::Error => format!(
            "Failed: {}",
            record.error.as_deref().unwrap_or("unknown error")
        ),
    }
}

pub fn transfer_line(record: &TransferRecord) -> String {
    format!(
        "{:<40} {:>10}  {}",
        truncate_string(&record.name, 40),
        format_file_size(record.size),
        transfer_status(record)
    )
}

#[derive(Serialize)]
struct FileListing<'a> {
    files: &'a [FileRecord],
    shown: usize,
    total: usize,
}

pub fn file_listing_json(files: &[FileRecord], summary: FilterSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&FileListing {
        files,
        shown: summary.shown,
        total: summary.total,
    })
}

pub fn file_table(files: &[FileRecord], summary: FilterSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== Files ===\n");
    let _ = writeln!(out, "{}", summary);

    if files.is_empty() {
        let _ = writeln!(out, "\nNo files match the current filters.");
        return out;
    }

    let _ = writeln!(
        out,
        "\n{:<32} {:<9} {:<6} {:>10} {:<20} {:<16} {}",
        "Filename", "Kind", "Type", "Size", "Uploaded At", "Uploader", "Tags"
    );
    let _ = writeln!(out, "{}", "-".repeat(110));

    for file in files {
        let _ = writeln!(
            out,
            "{:<32} {:<9} {:<6} {:>10} {:<20} {:<16} {}",
            truncate_string(&file.filename, 32),
            file.kind().as_str(),
            truncate_string(&subtype_label(&file.mime), 6),
            format_file_size(file.size),
            file.uploaded_at.format("%Y-%m-%d %H:%M:%S"),
            truncate_string(file.uploader.as_deref().unwrap_or("-"), 16),
            file.tag_badges().join(", ")
        );
    }

    out
}
