use filedeck_core::models::{TransferId, TransferRecord, TransferStatus};

use crate::events::TransferEvent;

/// Ordered list of tracked transfers, in submission order.
///
/// Events for ids that are no longer present (cleared, or removed after success)
/// are ignored, as are events for records that already reached a terminal state.
#[derive(Debug, Default, Clone)]
pub struct TransferQueue {
    records: Vec<TransferRecord>,
}

impl TransferQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, records: impl IntoIterator<Item = TransferRecord>) {
        self.records.extend(records);
    }

    /// Folds one event into the queue. Returns the record's resulting status when the
    /// event changed something.
    pub fn apply(&mut self, event: &TransferEvent) -> Option<TransferStatus> {
        let record = self.records.iter_mut().find(|r| &r.id == event.id())?;
        let before = (record.status, record.progress);

        let accepted = match event {
            TransferEvent::Progress { percent, .. } => record.mark_progress(*percent),
            TransferEvent::Completed { .. } => record.mark_done(),
            TransferEvent::Failed { message, .. } => record.mark_failed(message.clone()),
        };

        if accepted && before != (record.status, record.progress) {
            Some(record.status)
        } else {
            None
        }
    }

    pub fn remove(&mut self, id: &TransferId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| &r.id != id);
        self.records.len() != before
    }

    /// Drops every failed record and returns their ids.
    pub fn remove_failed(&mut self) -> Vec<TransferId> {
        let mut removed = Vec::new();
        self.records.retain(|r| {
            if r.status == TransferStatus::Error {
                removed.push(r.id.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn get(&self, id: &TransferId) -> Option<&TransferRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn records(&self) -> &[TransferRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
