//! Data models for the application
//!
//! This module contains all data structures shared between the dashboard, the
//! upload orchestrator and the HTTP client, organized by domain.

mod auth;
mod file;
mod filter_spec;
mod raw_file;
mod transfer;

// Re-export all models for convenient imports
pub use auth::*;
pub use file::*;
pub use filter_spec::*;
pub use raw_file::*;
pub use transfer::*;
