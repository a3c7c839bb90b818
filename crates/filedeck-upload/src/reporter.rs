use std::sync::atomic::{AtomicU8, Ordering};

use filedeck_core::models::TransferId;
use filedeck_core::ProgressSink;
use tokio::sync::mpsc;

use crate::events::TransferEvent;
use crate::orchestrator::Command;

const NOT_STARTED: u8 = u8::MAX;

/// Per-transfer progress cell. Converts byte counts into whole percentages and only
/// forwards a report when the percentage actually advances.
pub(crate) struct ProgressReporter {
    id: TransferId,
    last: AtomicU8,
    commands: mpsc::UnboundedSender<Command>,
}

impl ProgressReporter {
    pub(crate) fn new(id: TransferId, commands: mpsc::UnboundedSender<Command>) -> Self {
        Self {
            id,
            last: AtomicU8::new(NOT_STARTED),
            commands,
        }
    }

    fn percent(sent: u64, total: u64) -> u8 {
        let ratio = sent.min(total) as f64 / total as f64;
        (ratio * 100.0).round() as u8
    }
}

impl ProgressSink for ProgressReporter {
    fn report(&self, sent: u64, total: u64) {
        if total == 0 {
            return;
        }
        let percent = Self::percent(sent, total);

        let advanced = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                (last == NOT_STARTED || percent > last).then_some(percent)
            })
            .is_ok();

        if advanced {
            let event = TransferEvent::Progress {
                id: self.id.clone(),
                percent,
            };
            if self.commands.send(Command::Event(event)).is_err() {
                tracing::debug!(transfer_id = %self.id, "Upload queue closed, dropping progress");
            }
        }
    }
}
