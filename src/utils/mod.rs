//! Utility functions module
//!
//! Network client construction and error classification, plus backoff retry
//! for idempotent reads.

pub mod network;
pub mod retry;

pub use network::*;
pub use retry::*;
