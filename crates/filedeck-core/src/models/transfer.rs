use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Identifier of one tracked transfer.
///
/// Built from the submission timestamp, the file's position in its batch and its
/// name, so two files with the same name in one batch still get distinct ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(String);

impl TransferId {
    pub fn new(submitted_at_ms: i64, index: usize, name: &str) -> Self {
        Self(format!("{}-{}-{}", submitted_at_ms, index, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TransferId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    #[default]
    Idle,
    Uploading,
    Done,
    Error,
}

impl TransferStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Done | TransferStatus::Error)
    }
}

impl Display for TransferStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            TransferStatus::Idle => write!(f, "idle"),
            TransferStatus::Uploading => write!(f, "uploading"),
            TransferStatus::Done => write!(f, "done"),
            TransferStatus::Error => write!(f, "error"),
        }
    }
}

impl FromStr for TransferStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(TransferStatus::Idle),
            "uploading" => Ok(TransferStatus::Uploading),
            "done" => Ok(TransferStatus::Done),
            "error" => Ok(TransferStatus::Error),
            _ => Err(anyhow::anyhow!("Invalid transfer status: {}", s)),
        }
    }
}

/// One file's upload as shown in the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: TransferId,
    pub name: String,
    pub size: u64,
    /// Integer percentage, 0..=100.
    pub progress: u8,
    pub status: TransferStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransferRecord {
    pub fn new(id: TransferId, name: impl Into<String>, size: u64) -> Self {
        Self {
            id,
            name: name.into(),
            size,
            progress: 0,
            status: TransferStatus::Idle,
            error: None,
        }
    }

    /// Applies a progress report. Returns false when the record is already terminal.
    pub fn mark_progress(&mut self, percent: u8) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = TransferStatus::Uploading;
        self.progress = percent.min(100).max(self.progress);
        true
    }

    /// Marks the transfer as successfully completed. Returns false when already terminal.
    pub fn mark_done(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = TransferStatus::Done;
        self.progress = 100;
        true
    }

    /// Marks the transfer as failed with a diagnostic. Returns false when already terminal.
    pub fn mark_failed(&mut self, message: impl Into<String>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = TransferStatus::Error;
        self.error = Some(message.into());
        true
    }
}
