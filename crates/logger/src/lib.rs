//! Diagnostic logging for the health checker binaries.
//!
//! Diagnostics go to stderr. Stdout is reserved for the JSON event records
//! produced by `healthcheck::EventSink`.

mod subscriber;

pub use subscriber::{init, init_with_level};
