use filedeck_core::models::TransferId;

/// State change reported by one transfer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    /// Bytes are flowing; `percent` is the rounded share of the body sent.
    Progress { id: TransferId, percent: u8 },
    /// The endpoint answered with a 2xx status.
    Completed { id: TransferId },
    /// Non-2xx response or transport failure.
    Failed { id: TransferId, message: String },
}

impl TransferEvent {
    pub fn id(&self) -> &TransferId {
        match self {
            TransferEvent::Progress { id, .. }
            | TransferEvent::Completed { id }
            | TransferEvent::Failed { id, .. } => id,
        }
    }
}
