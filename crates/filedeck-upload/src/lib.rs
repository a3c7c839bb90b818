//! Upload orchestration: turns a batch of files into tracked transfers, runs them
//! concurrently against an [`filedeck_core::UploadTransport`], and keeps a queue view
//! that renders each transfer's progress, completion or failure.
//!
//! Every transfer runs as its own task and reports through a channel to a single
//! consumer, which is the only place the queue is mutated.

pub mod error;
pub mod events;
pub mod orchestrator;
pub mod queue;
mod removal;
mod reporter;

pub use error::UploadError;
pub use events::TransferEvent;
pub use orchestrator::{BatchReport, FilesChangedCallback, OrchestratorConfig, UploadOrchestrator};
pub use queue::TransferQueue;
