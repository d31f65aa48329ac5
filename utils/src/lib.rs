//! Shared utilities for the peerlink sidecar.

pub mod logging;
pub mod time;

pub use logging::{init_logging, LogFormat};
pub use time::{format_duration, parse_duration};
