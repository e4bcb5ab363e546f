//! opwatch - Azure Service Management operation toolkit
//!
//! A client library and CLI for driving long-running service-management
//! operations: polling operation-status resources to completion and
//! performing two-phase uploads with compensating cleanup.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod operation;
pub mod transport;
pub mod upload;
pub mod utils;

// Re-export commonly used types
pub use error::{OpwatchError, Result};
