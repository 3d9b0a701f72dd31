//! Tracing setup: structured JSON logs, optionally exported as OTLP spans.
//!
//! # Telemetry invariants
//!
//! - **No token, field value or key material** may appear in any span
//!   attribute or log field.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//!   takes precedence when set.

pub mod init;

pub use init::{init_telemetry, shutdown};
