//! # symgraph Utilities
//!
//! Shared utilities, logging, and helpers for symgraph.
//!
//! This crate provides common functionality used across the symgraph
//! workspace, mainly the `tracing` subscriber setup.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{init_build_log, init_logging, init_logging_with_level, LogFormat, LogLevel, LoggingError};
pub use tracing::{debug, error, info, trace, warn};
