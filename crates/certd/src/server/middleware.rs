//! Limits applied to the router by shared middleware layers.

use std::time::Duration;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest request body accepted. Tokens are a few kilobytes at most.
pub const MAX_BODY_BYTES: usize = 64 * 1024;
