//! Configuration management
//!
//! File-backed settings with environment overrides for the CLI and any
//! embedding application.

pub mod settings;

pub use settings::{load_config, load_config_unvalidated, Config};
