//! Common types and utilities for rancp
//!
//! This crate provides the shared identifier types, configuration model,
//! logging setup, and error type used across the rancp crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{CellConfig, DuConfig, NgapConfig, NodeConfig};
pub use error::Error;
pub use logging::{init_logging, init_logging_with_filter, LogLevel};
pub use types::*;
