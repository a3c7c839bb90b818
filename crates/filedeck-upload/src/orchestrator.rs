//! Upload orchestrator: per-file transfer tasks, a single queue consumer, and timed
//! removal of completed transfers.
//!
//! Shutdown: [`UploadOrchestrator::shutdown`] stops the consumer, which owns the pending
//! removals; it does not abort transfers already in flight. Dropping every clone of
//! the orchestrator has the same effect once those transfers finish.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch, Semaphore};
use tokio::task::JoinSet;

use filedeck_core::models::{RawFile, TransferId, TransferRecord, TransferStatus};
use filedeck_core::{ClientConfig, TokenSource, TransportError, UploadTransport};

use crate::error::UploadError;
use crate::events::TransferEvent;
use crate::queue::TransferQueue;
use crate::removal::RemovalSchedule;
use crate::reporter::ProgressReporter;

/// Invoked once for every transfer that completes successfully, so a file listing
/// can be refreshed.
pub type FilesChangedCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// How long a completed transfer stays visible before it is dropped from the queue.
    pub removal_delay: Duration,
    /// Upper bound on simultaneous transfers. `None` dispatches a whole batch at once.
    pub max_concurrent: Option<usize>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            removal_delay: Duration::from_millis(2000),
            max_concurrent: None,
        }
    }
}

impl From<&ClientConfig> for OrchestratorConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            removal_delay: config.removal_delay(),
            max_concurrent: config.max_concurrent_uploads,
        }
    }
}

/// Outcome of one submitted batch, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: Vec<TransferId>,
    pub failed: Vec<(TransferId, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

pub(crate) enum Command {
    Enqueue(Vec<TransferRecord>),
    Event(TransferEvent),
    Expire(TransferId),
    Clear(TransferId, oneshot::Sender<bool>),
    ClearFailed(oneshot::Sender<usize>),
    Snapshot(oneshot::Sender<Vec<TransferRecord>>),
    PendingRemovals(oneshot::Sender<usize>),
    Shutdown,
}

enum TransferOutcome {
    Succeeded,
    Failed(String),
}

#[derive(Clone)]
pub struct UploadOrchestrator {
    transport: Arc<dyn UploadTransport>,
    tokens: Arc<dyn TokenSource>,
    config: OrchestratorConfig,
    limiter: Option<Arc<Semaphore>>,
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<Vec<TransferRecord>>,
}

impl UploadOrchestrator {
    /// Creates the orchestrator and spawns its queue consumer on the current runtime.
    pub fn new(
        transport: Arc<dyn UploadTransport>,
        tokens: Arc<dyn TokenSource>,
        config: OrchestratorConfig,
        on_files_changed: Option<FilesChangedCallback>,
    ) -> Self {
        let (commands, commands_rx) = mpsc::unbounded_channel();
        let (view_tx, view) = watch::channel(Vec::new());
        let limiter = config
            .max_concurrent
            .map(|permits| Arc::new(Semaphore::new(permits.max(1))));

        let removal_delay = config.removal_delay;

        tokio::spawn(async move {
            Self::consume(commands_rx, view_tx, removal_delay, on_files_changed).await;
        });

        Self {
            transport,
            tokens,
            config,
            limiter,
            commands,
            view,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Queues `files` and runs every transfer to a terminal state.
    ///
    /// Fails with [`UploadError::MissingCredential`] before queueing anything when no
    /// token is available. Individual transfer failures are recorded on their queue
    /// entry and in the returned report; they never fail the batch.
    #[tracing::instrument(skip(self, files), fields(batch_size = files.len()))]
    pub async fn submit(&self, files: Vec<RawFile>) -> Result<BatchReport, UploadError> {
        if files.is_empty() {
            return Ok(BatchReport::default());
        }

        let token = match self.tokens.token() {
            Some(token) => Arc::<str>::from(token),
            None => {
                tracing::warn!("Upload rejected: no credential available");
                return Err(UploadError::MissingCredential);
            }
        };

        let submitted_at = Utc::now().timestamp_millis();
        let records: Vec<TransferRecord> = files
            .iter()
            .enumerate()
            .map(|(index, file)| {
                TransferRecord::new(
                    TransferId::new(submitted_at, index, &file.name),
                    file.name.clone(),
                    file.size,
                )
            })
            .collect();
        let ids: Vec<TransferId> = records.iter().map(|r| r.id.clone()).collect();

        self.send(Command::Enqueue(records))?;

        let mut tasks = JoinSet::new();
        let mut positions = HashMap::new();
        for (index, (id, file)) in ids.iter().cloned().zip(files).enumerate() {
            let handle = tasks.spawn(Self::run_transfer(
                id,
                file,
                token.clone(),
                self.transport.clone(),
                self.commands.clone(),
                self.limiter.clone(),
            ));
            positions.insert(handle.id(), index);
        }

        let mut outcomes: Vec<Option<TransferOutcome>> = ids.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Err(e) => {
                    let Some(&index) = positions.get(&e.id()) else {
                        continue;
                    };
                    tracing::error!(transfer_id = %ids[index], error = %e, "Transfer task aborted");
                    let message = "upload interrupted".to_string();
                    self.send(Command::Event(TransferEvent::Failed {
                        id: ids[index].clone(),
                        message: message.clone(),
                    }))?;
                    outcomes[index] = Some(TransferOutcome::Failed(message));
                }
                Ok((id, outcome)) => {
                    if let Some(index) = ids.iter().position(|candidate| candidate == &id) {
                        outcomes[index] = Some(outcome);
                    }
                }
            }
        }

        // Every terminal event is already in the channel; wait until the consumer
        // has folded them so the published view reflects the whole batch.
        self.snapshot().await?;

        let mut report = BatchReport::default();
        for (id, outcome) in ids.into_iter().zip(outcomes) {
            match outcome {
                Some(TransferOutcome::Succeeded) => report.succeeded.push(id),
                Some(TransferOutcome::Failed(message)) => report.failed.push((id, message)),
                None => {}
            }
        }

        tracing::info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Upload batch finished"
        );

        Ok(report)
    }

    /// Receiver that observes every published version of the queue.
    pub fn subscribe(&self) -> watch::Receiver<Vec<TransferRecord>> {
        self.view.clone()
    }

    /// Current queue contents, after all previously sent events have been applied.
    pub async fn snapshot(&self) -> Result<Vec<TransferRecord>, UploadError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx))?;
        rx.await.map_err(|_| UploadError::QueueStopped)
    }

    /// Dismisses one transfer. Cancels its pending removal if it has one.
    pub async fn clear(&self, id: &TransferId) -> Result<bool, UploadError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Clear(id.clone(), tx))?;
        rx.await.map_err(|_| UploadError::QueueStopped)
    }

    /// Dismisses every failed transfer and returns how many were removed.
    pub async fn clear_failed(&self) -> Result<usize, UploadError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::ClearFailed(tx))?;
        rx.await.map_err(|_| UploadError::QueueStopped)
    }

    /// Completed transfers still waiting for their timed removal.
    pub async fn pending_removals(&self) -> Result<usize, UploadError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::PendingRemovals(tx))?;
        rx.await.map_err(|_| UploadError::QueueStopped)
    }

    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }

    fn send(&self, command: Command) -> Result<(), UploadError> {
        self.commands
            .send(command)
            .map_err(|_| UploadError::QueueStopped)
    }

    async fn run_transfer(
        id: TransferId,
        file: RawFile,
        token: Arc<str>,
        transport: Arc<dyn UploadTransport>,
        commands: mpsc::UnboundedSender<Command>,
        limiter: Option<Arc<Semaphore>>,
    ) -> (TransferId, TransferOutcome) {
        let _permit = match limiter {
            Some(semaphore) => semaphore.acquire_owned().await.ok(),
            None => None,
        };

        tracing::debug!(transfer_id = %id, size = file.size, "Starting transfer");

        let reporter = Arc::new(ProgressReporter::new(id.clone(), commands.clone()));
        let (event, outcome) = match transport.upload(file, &token, reporter).await {
            Ok(response) if response.is_success() => {
                tracing::info!(transfer_id = %id, status = response.status, "Transfer completed");
                (
                    TransferEvent::Completed { id: id.clone() },
                    TransferOutcome::Succeeded,
                )
            }
            Ok(response) => {
                let message = response.failure_message();
                tracing::warn!(
                    transfer_id = %id,
                    status = response.status,
                    error = %message,
                    "Transfer rejected"
                );
                (
                    TransferEvent::Failed {
                        id: id.clone(),
                        message: message.clone(),
                    },
                    TransferOutcome::Failed(message),
                )
            }
            Err(e) => {
                tracing::warn!(transfer_id = %id, error = %e, "Transfer failed");
                let message = TransportError::USER_MESSAGE.to_string();
                (
                    TransferEvent::Failed {
                        id: id.clone(),
                        message: message.clone(),
                    },
                    TransferOutcome::Failed(message),
                )
            }
        };

        if commands.send(Command::Event(event)).is_err() {
            tracing::debug!(transfer_id = %id, "Upload queue closed before transfer finished");
        }

        (id, outcome)
    }

    async fn consume(
        mut commands: mpsc::UnboundedReceiver<Command>,
        view: watch::Sender<Vec<TransferRecord>>,
        removal_delay: Duration,
        on_files_changed: Option<FilesChangedCallback>,
    ) {
        tracing::debug!(
            removal_delay_ms = removal_delay.as_millis() as u64,
            "Upload queue consumer started"
        );

        let mut queue = TransferQueue::new();
        let mut removals = RemovalSchedule::new(removal_delay);

        loop {
            let command = tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => command,
                    None => break,
                },
                Some(id) = removals.next_expired(), if !removals.is_empty() => Command::Expire(id),
            };

            let changed = match command {
                Command::Enqueue(records) => {
                    queue.enqueue(records);
                    true
                }
                Command::Event(event) => match queue.apply(&event) {
                    Some(TransferStatus::Done) => {
                        removals.schedule(event.id().clone());
                        if let Some(callback) = &on_files_changed {
                            callback();
                        }
                        true
                    }
                    Some(_) => true,
                    None => false,
                },
                Command::Expire(id) => queue.remove(&id),
                Command::Clear(id, reply) => {
                    removals.cancel(&id);
                    let removed = queue.remove(&id);
                    let _ = reply.send(removed);
                    removed
                }
                Command::ClearFailed(reply) => {
                    let removed = queue.remove_failed();
                    let _ = reply.send(removed.len());
                    !removed.is_empty()
                }
                Command::Snapshot(reply) => {
                    let _ = reply.send(queue.records().to_vec());
                    false
                }
                Command::PendingRemovals(reply) => {
                    let _ = reply.send(removals.len());
                    false
                }
                Command::Shutdown => break,
            };

            if changed {
                view.send_replace(queue.records().to_vec());
            }
        }

        tracing::info!(pending_removals = removals.len(), "Upload queue consumer stopped");
    }
}
