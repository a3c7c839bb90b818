//! Filedeck Core Library
//!
//! This crate provides the domain models, the dashboard filter engine, error types,
//! configuration and the seams (credential source, upload transport) that are shared
//! across all filedeck components.

pub mod config;
pub mod credentials;
pub mod error;
pub mod filter;
pub mod format;
pub mod models;
pub mod transport;
pub mod validation;

// Re-export commonly used types
pub use config::ClientConfig;
pub use credentials::{EnvToken, StaticToken, TokenSource};
pub use error::{AppError, LogLevel};
pub use filter::{apply, matches, FilterSummary};
pub use transport::{ProgressSink, TransportError, TransportResponse, UploadTransport};
