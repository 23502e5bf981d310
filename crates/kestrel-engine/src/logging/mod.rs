//! Logging setup.
//!
//! Engine code logs through the `log` facade only. Applications either call
//! [`init_logging`] or install their own logger.

mod init;

pub use init::{init_logging, LoggingConfig};
